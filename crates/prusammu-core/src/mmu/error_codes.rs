//! MMU Error Code Decoder
//!
//! Converts the firmware's hex error codes to structured, human-readable
//! descriptors. The keys come from the firmware's bitmask-derived error
//! space, mapped against the published Prusa error-codes list
//! (04xxx family). Temperature and electrical codes are bitmasks where
//! several conditions can overlap; only the single-chip codes are
//! listed, matching what the printer firmware itself displays.
//!
//! Several raw codes map to the same descriptor (shared root cause,
//! e.g. "pulley cannot move" is reachable via two codes).

/// Structured description of one firmware error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    /// Canonical 5-digit error code.
    pub code: &'static str,
    /// Short display title.
    pub title: &'static str,
    /// Long description with remediation hints.
    pub text: &'static str,
    /// Stable identifier.
    pub id: &'static str,
}

impl ErrorDescriptor {
    /// Documentation URL for this error, synthesized from the canonical code.
    pub fn url(&self) -> String {
        format!("https://prusa.io/{}", self.code)
    }
}

/// Descriptor returned for unknown, empty or malformed codes.
pub const UNKNOWN_ERROR: ErrorDescriptor = ErrorDescriptor {
    code: "04900",
    title: "UNKNOWN ERROR",
    text: "Unexpected error occurred.",
    id: "UNKNOWN_ERROR",
};

/// Decode a firmware hex error code to its descriptor.
///
/// Codes are case-normalized and may carry the raw `E` prefix seen on
/// the serial line. Unknown, empty or malformed codes resolve to
/// [`UNKNOWN_ERROR`]; this function never fails.
pub fn lookup_error(code: &str) -> &'static ErrorDescriptor {
    let normalized = code.trim().to_ascii_lowercase();
    let key = normalized.strip_prefix('e').unwrap_or(&normalized);
    match key {
        // MECHANICAL xx1xx
        "8001" => &ErrorDescriptor {
            code: "04101",
            title: "FINDA DIDNT TRIGGER",
            text: "FINDA didn't trigger while loading the filament. Ensure the filament can move and FINDA works.",
            id: "FINDA_DIDNT_TRIGGER",
        },
        "8002" => &ErrorDescriptor {
            code: "04102",
            title: "FINDA FILAM. STUCK",
            text: "FINDA didn't switch off while unloading filament. Try unloading manually. Ensure filament can move and FINDA works.",
            id: "FINDA_FILAMENT_STUCK",
        },
        "8003" => &ErrorDescriptor {
            code: "04103",
            title: "FSENSOR DIDNT TRIGG.",
            text: "Filament sensor didn't trigger while loading the filament. Ensure the sensor is calibrated and the filament reached it.",
            id: "FSENSOR_DIDNT_TRIGGER",
        },
        "8004" => &ErrorDescriptor {
            code: "04104",
            title: "FSENSOR FIL. STUCK",
            text: "Filament sensor didn't switch off while unloading filament. Ensure filament can move and the sensor works.",
            id: "FSENSOR_FILAMENT_STUCK",
        },
        // Two raw codes share this descriptor.
        "8047" | "804b" => &ErrorDescriptor {
            code: "04105",
            title: "PULLEY CANNOT MOVE",
            text: "Pulley motor stalled. Ensure the pulley can move and check the wiring.",
            id: "PULLEY_CANNOT_MOVE",
        },
        "8009" => &ErrorDescriptor {
            code: "04106",
            title: "FSENSOR TOO EARLY",
            text: "Filament sensor triggered too early while loading to extruder. Check there isn't anything stuck in PTFE tube. Check that sensor reads properly.",
            id: "FSENSOR_TOO_EARLY",
        },
        "800a" => &ErrorDescriptor {
            code: "04107",
            title: "INSPECT FINDA",
            text: "Selector can't move due to FINDA detecting a filament. Make sure no filament is in Selector and FINDA works properly.",
            id: "INSPECT_FINDA",
        },
        "802a" => &ErrorDescriptor {
            code: "04108",
            title: "LOAD TO EXTR. FAILED",
            text: "Loading to extruder failed. Inspect the filament tip shape. Refine the sensor calibration, if needed.",
            id: "LOAD_TO_EXTRUDER_FAILED",
        },
        "8087" => &ErrorDescriptor {
            code: "04115",
            title: "SELECTOR CANNOT HOME",
            text: "The Selector cannot home properly. Check for anything blocking its movement.",
            id: "SELECTOR_CANNOT_HOME",
        },
        "808b" => &ErrorDescriptor {
            code: "04116",
            title: "SELECTOR CANNOT MOVE",
            text: "The Selector cannot move. Check for anything blocking its movement. Check if the wiring is correct.",
            id: "SELECTOR_CANNOT_MOVE",
        },
        "8107" => &ErrorDescriptor {
            code: "04125",
            title: "IDLER CANNOT HOME",
            text: "The Idler cannot home properly. Check for anything blocking its movement.",
            id: "IDLER_CANNOT_HOME",
        },
        "810b" => &ErrorDescriptor {
            code: "04126",
            title: "IDLER CANNOT MOVE",
            text: "The Idler cannot move properly. Check for anything blocking its movement. Check if the wiring is correct.",
            id: "IDLER_CANNOT_MOVE",
        },

        // TEMPERATURE xx2xx
        "a040" => &ErrorDescriptor {
            code: "04201",
            title: "WARNING TMC TOO HOT",
            text: "TMC driver for the Pulley motor is almost overheating. Make sure there is sufficient airflow near the MMU board.",
            id: "WARNING_TMC_PULLEY_TOO_HOT",
        },
        "a080" => &ErrorDescriptor {
            code: "04211",
            title: "WARNING TMC TOO HOT",
            text: "TMC driver for the Selector motor is almost overheating. Make sure there is sufficient airflow near the MMU board.",
            id: "WARNING_TMC_SELECTOR_TOO_HOT",
        },
        "a100" => &ErrorDescriptor {
            code: "04221",
            title: "WARNING TMC TOO HOT",
            text: "TMC driver for the Idler motor is almost overheating. Make sure there is sufficient airflow near the MMU board.",
            id: "WARNING_TMC_IDLER_TOO_HOT",
        },
        "c040" => &ErrorDescriptor {
            code: "04202",
            title: "TMC OVERHEAT ERROR",
            text: "TMC driver for the Pulley motor is overheated. Cool down the MMU board and reset MMU.",
            id: "TMC_PULLEY_OVERHEAT_ERROR",
        },
        "c080" => &ErrorDescriptor {
            code: "04212",
            title: "TMC OVERHEAT ERROR",
            text: "TMC driver for the Selector motor is overheated. Cool down the MMU board and reset MMU.",
            id: "TMC_SELECTOR_OVERHEAT_ERROR",
        },
        "c100" => &ErrorDescriptor {
            code: "04222",
            title: "TMC OVERHEAT ERROR",
            text: "TMC driver for the Idler motor is overheated. Cool down the MMU board and reset MMU.",
            id: "TMC_IDLER_OVERHEAT_ERROR",
        },

        // ELECTRICAL xx3xx
        "8240" => &ErrorDescriptor {
            code: "04301",
            title: "TMC DRIVER ERROR",
            text: "TMC driver for the Pulley motor is not responding. Try resetting the MMU. If the issue persists contact support.",
            id: "TMC_PULLEY_DRIVER_ERROR",
        },
        "8280" => &ErrorDescriptor {
            code: "04311",
            title: "TMC DRIVER ERROR",
            text: "TMC driver for the Selector motor is not responding. Try resetting the MMU. If the issue persists contact support.",
            id: "TMC_SELECTOR_DRIVER_ERROR",
        },
        "8300" => &ErrorDescriptor {
            code: "04321",
            title: "TMC DRIVER ERROR",
            text: "TMC driver for the Idler motor is not responding. Try resetting the MMU. If the issue persists contact support.",
            id: "TMC_IDLER_DRIVER_ERROR",
        },
        "8440" => &ErrorDescriptor {
            code: "04302",
            title: "TMC DRIVER RESET",
            text: "TMC driver for the Pulley motor was restarted. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_PULLEY_DRIVER_RESET",
        },
        "8480" => &ErrorDescriptor {
            code: "04312",
            title: "TMC DRIVER RESET",
            text: "TMC driver for the Selector motor was restarted. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_SELECTOR_DRIVER_RESET",
        },
        "8500" => &ErrorDescriptor {
            code: "04322",
            title: "TMC DRIVER RESET",
            text: "TMC driver for the Idler motor was restarted. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_IDLER_DRIVER_RESET",
        },
        "8840" => &ErrorDescriptor {
            code: "04303",
            title: "TMC UNDERVOLTAGE ERR",
            text: "Not enough current for the Pulley TMC driver. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_PULLEY_UNDERVOLTAGE_ERROR",
        },
        "8880" => &ErrorDescriptor {
            code: "04313",
            title: "TMC UNDERVOLTAGE ERR",
            text: "Not enough current for the Selector TMC driver. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_SELECTOR_UNDERVOLTAGE_ERROR",
        },
        "8900" => &ErrorDescriptor {
            code: "04323",
            title: "TMC UNDERVOLTAGE ERR",
            text: "Not enough current for the Idler TMC driver. There is probably an issue with the electronics. Check the wiring and connectors.",
            id: "TMC_IDLER_UNDERVOLTAGE_ERROR",
        },
        "9040" => &ErrorDescriptor {
            code: "04304",
            title: "TMC DRIVER SHORTED",
            text: "Short circuit on the Pulley TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "TMC_PULLEY_DRIVER_SHORTED",
        },
        "9080" => &ErrorDescriptor {
            code: "04314",
            title: "TMC DRIVER SHORTED",
            text: "Short circuit on the Selector TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "TMC_SELECTOR_DRIVER_SHORTED",
        },
        "9100" => &ErrorDescriptor {
            code: "04324",
            title: "TMC DRIVER SHORTED",
            text: "Short circuit on the Idler TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "TMC_IDLER_DRIVER_SHORTED",
        },
        "c240" => &ErrorDescriptor {
            code: "04305",
            title: "MMU SELFTEST FAILED",
            text: "MMU selftest failed on the Pulley TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "MMU_PULLEY_SELFTEST_FAILED",
        },
        "c280" => &ErrorDescriptor {
            code: "04315",
            title: "MMU SELFTEST FAILED",
            text: "MMU selftest failed on the Selector TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "MMU_SELECTOR_SELFTEST_FAILED",
        },
        "c300" => &ErrorDescriptor {
            code: "04325",
            title: "MMU SELFTEST FAILED",
            text: "MMU selftest failed on the Idler TMC driver. Check the wiring and connectors. If the issue persists contact support.",
            id: "MMU_IDLER_SELFTEST_FAILED",
        },
        "800d" => &ErrorDescriptor {
            code: "04306",
            title: "MMU MCU ERROR",
            text: "MMU detected a power-related issue. Check the wiring and connectors. If the issue persists, contact support.",
            id: "MCU_POWER_ERROR",
        },

        // CONNECTIVITY xx4xx
        "802e" => &ErrorDescriptor {
            code: "04401",
            title: "MMU NOT RESPONDING",
            text: "MMU not responding. Check the wiring and connectors.",
            id: "MMU_NOT_RESPONDING",
        },
        "802d" => &ErrorDescriptor {
            code: "04402",
            title: "COMMUNICATION ERROR",
            text: "MMU not responding correctly. Check the wiring and connectors.",
            id: "COMMUNICATION_ERROR",
        },

        // SYSTEM xx5xx
        "8005" => &ErrorDescriptor {
            code: "04501",
            title: "FIL. ALREADY LOADED",
            text: "Cannot perform the action, filament is already loaded. Unload it first.",
            id: "FILAMENT_ALREADY_LOADED",
        },
        "8006" => &ErrorDescriptor {
            code: "04502",
            title: "INVALID TOOL",
            text: "Requested filament tool is not available on this hardware. Check the G-code for tool index out of range (T0-T4).",
            id: "INVALID_TOOL",
        },
        "802b" => &ErrorDescriptor {
            code: "04503",
            title: "QUEUE FULL",
            text: "MMU Firmware internal error, please reset the MMU.",
            id: "QUEUE_FULL",
        },
        "802c" => &ErrorDescriptor {
            code: "04504",
            title: "MMU FW UPDATE NEEDED",
            text: "The MMU firmware version is incompatible with the printer's FW. Update to compatible version.",
            id: "FW_UPDATE_NEEDED",
        },
        "802f" => &ErrorDescriptor {
            code: "04505",
            title: "FW RUNTIME ERROR",
            text: "Internal runtime error. Try resetting the MMU or updating the firmware.",
            id: "FW_RUNTIME_ERROR",
        },
        "8008" => &ErrorDescriptor {
            code: "04506",
            title: "UNLOAD MANUALLY",
            text: "Filament detected unexpectedly. Ensure no filament is loaded. Check the sensors and wiring.",
            id: "UNLOAD_MANUALLY",
        },
        "800c" => &ErrorDescriptor {
            code: "04507",
            title: "FILAMENT EJECTED",
            text: "Remove the ejected filament from the front of the MMU.",
            id: "FILAMENT_EJECTED",
        },
        "8029" => &ErrorDescriptor {
            code: "04508",
            title: "FILAMENT CHANGE",
            text: "M600 Filament Change. Load a new filament or eject the old one.",
            id: "FILAMENT_CHANGE",
        },

        _ => &UNKNOWN_ERROR,
    }
}
