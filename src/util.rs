use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_amount(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };

    if value >= 1.0e7 {
        format!("₹{:.2}Cr", value / 1.0e7)
    } else if value >= 1.0e5 {
        format!("₹{:.2}L", value / 1.0e5)
    } else if value >= 1.0e3 {
        format!("₹{:.1}K", value / 1.0e3)
    } else {
        format!("₹{value:.0}")
    }
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let mut truncated = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    truncated.push('…');
    truncated
}

/// Deterministic per-id value in [0, 1), used where the layout needs a
/// scatter source that is stable across snapshot rebuilds.
pub fn stable_unit(id: &str) -> f32 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    (((hash & 0xffff_ffff) as f64) / ((u32::MAX as f64) + 1.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts_across_scales() {
        assert_eq!(format_amount(420.0), "₹420");
        assert_eq!(format_amount(12_500.0), "₹12.5K");
        assert_eq!(format_amount(342_000.0), "₹3.42L");
        assert_eq!(format_amount(12_000_000.0), "₹1.20Cr");
    }

    #[test]
    fn truncates_long_labels_with_ellipsis() {
        assert_eq!(truncate_label("Acme Traders", 20), "Acme Traders");
        assert_eq!(
            truncate_label("Acme Traders Private Limited", 12),
            "Acme Trader…"
        );
        assert_eq!(
            truncate_label("Acme Traders Private Limited", 12)
                .chars()
                .count(),
            12
        );
    }

    #[test]
    fn stable_unit_is_deterministic_and_bounded() {
        let a = stable_unit("27AAACA1234A1Z5");
        let b = stable_unit("27AAACA1234A1Z5");
        assert_eq!(a, b);
        assert!((0.0..1.0).contains(&a));
        assert_ne!(stable_unit("x"), stable_unit("y"));
    }
}
