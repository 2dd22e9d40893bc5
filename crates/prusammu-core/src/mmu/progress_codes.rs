//! MMU Progress Code Decoder
//!
//! Converts the firmware's hex progress codes to short status strings
//! suitable for the navbar. The strings mirror the firmware's own
//! progress-converter table.

/// Message shown when a progress code is empty or not recognized.
pub const UNKNOWN_PROGRESS: &str = "UNKNOWN";

/// Decode a firmware hex progress code to its display string.
///
/// Codes are case-normalized and stripped of leading zeros before
/// lookup ("0a" and "A" both resolve to "Disengaging idler"). Unknown
/// or empty codes resolve to [`UNKNOWN_PROGRESS`]; this function never
/// fails.
pub fn lookup_progress(code: &str) -> &'static str {
    let normalized = code.trim().to_ascii_lowercase();
    let key = normalized.trim_start_matches('0');
    // "0" itself trims to empty; only a non-empty input maps back to it.
    if key.is_empty() {
        return if normalized.is_empty() { UNKNOWN_PROGRESS } else { "OK" };
    }
    match key {
        "1" => "Engaging idler",
        "2" => "Disengaging idler",
        "3" => "Unloading to FINDA",
        "4" => "Unloading to pulley",
        "5" => "Feeding to FINDA",
        "6" => "Feeding to extruder",
        "7" => "Feeding to nozzle",
        "8" => "Avoiding grind",
        "9" => "Finishing movements",
        "a" => "Disengaging idler",
        "b" => "Engaging idler",
        "c" => "ERR Wait for User",
        "d" => "ERR Internal",
        "e" => "ERR Help filament",
        "f" => "ERR TMC failed",
        "10" => "Unloading filament",
        "11" => "Loading filament",
        "12" => "Selecting fil. slot",
        "13" => "Preparing blade",
        "14" => "Pushing filament",
        "15" => "Performing cut",
        "16" => "Returning selector",
        "17" => "Parking selector",
        "18" => "Ejecting filament",
        "19" => "Retract from FINDA",
        "1a" => "Homing",
        "1b" => "Moving selector",
        "1c" => "Feeding to FSensor",
        _ => UNKNOWN_PROGRESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_known_codes() {
        assert_eq!(lookup_progress("0"), "OK");
        assert_eq!(lookup_progress("5"), "Feeding to FINDA");
        assert_eq!(lookup_progress("1c"), "Feeding to FSensor");
    }

    #[test]
    fn test_lookup_normalization() {
        assert_eq!(lookup_progress("1C"), "Feeding to FSensor");
        assert_eq!(lookup_progress("0a"), "Disengaging idler");
        assert_eq!(lookup_progress(" 07 "), "Feeding to nozzle");
        assert_eq!(lookup_progress("00"), "OK");
    }

    #[test]
    fn test_lookup_unknown_codes() {
        assert_eq!(lookup_progress(""), UNKNOWN_PROGRESS);
        assert_eq!(lookup_progress("1d"), UNKNOWN_PROGRESS);
        assert_eq!(lookup_progress("zz"), UNKNOWN_PROGRESS);
    }

    proptest! {
        // Lookup is total over arbitrary input.
        #[test]
        fn lookup_never_panics(code in ".*") {
            let message = lookup_progress(&code);
            prop_assert!(!message.is_empty());
        }
    }
}
