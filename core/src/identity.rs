//! Boss identity normalization
//!
//! The upstream feed reports every infected-class encounter under the single
//! raw name `infected`, covering both the guaranteed horde events and the
//! rare roaming variant. The spawn probability is the only signal separating
//! the two, so the display identity is derived from it here and nowhere else.
//!
//! This must be applied on BOTH sides of any comparison (old vs. new
//! snapshot). Comparing a normalized name against a raw one breaks the diff
//! engine and every dedup key downstream.

/// Raw name the upstream feed uses for both infected variants.
const INFECTED_RAW: &str = "infected";

/// Identity for the guaranteed (chance == 1.0) variant.
const INFECTED_COMMON: &str = "Infected";

/// Identity for the rare roaming (chance < 1.0) variant.
const INFECTED_RARE: &str = "Infected (Rare)";

/// Resolve a raw boss name into its stable display identity.
///
/// Only `"infected"` is ambiguous: a spawn chance strictly below 1.0 selects
/// the rare variant, exactly 1.0 the common one. All other names pass
/// through unchanged. Pure and idempotent.
pub fn normalize_boss_name(raw: &str, spawn_chance: f64) -> &str {
    if raw == INFECTED_RAW {
        if spawn_chance < 1.0 {
            INFECTED_RARE
        } else {
            INFECTED_COMMON
        }
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_for_unambiguous_names() {
        assert_eq!(normalize_boss_name("Killa", 0.3), "Killa");
        assert_eq!(normalize_boss_name("Reshala", 1.0), "Reshala");
        assert_eq!(normalize_boss_name("", 0.5), "");
    }

    #[test]
    fn infected_splits_on_spawn_chance() {
        assert_eq!(normalize_boss_name("infected", 0.35), "Infected (Rare)");
        assert_eq!(normalize_boss_name("infected", 1.0), "Infected");
    }

    #[test]
    fn boundary_at_exactly_one_is_common() {
        // Strict `<` for the rare branch; 1.0 itself is NOT rare.
        assert_eq!(normalize_boss_name("infected", 0.999), "Infected (Rare)");
        assert_eq!(normalize_boss_name("infected", 1.0), "Infected");
    }

    #[test]
    fn normalization_is_idempotent() {
        for chance in [0.0, 0.5, 0.999, 1.0] {
            let once = normalize_boss_name("infected", chance);
            assert_eq!(normalize_boss_name(once, chance), once);

            let plain = normalize_boss_name("Shturman", chance);
            assert_eq!(normalize_boss_name(plain, chance), plain);
        }
    }

    #[test]
    fn case_sensitive_raw_name() {
        // Only the exact lowercase raw name is remapped; a display-cased
        // "Infected" coming back through is left alone (idempotence).
        assert_eq!(normalize_boss_name("Infected", 0.5), "Infected");
    }
}
