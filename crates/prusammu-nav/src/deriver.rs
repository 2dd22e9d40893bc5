//! Navigation state deriver
//!
//! Pure recomputation of the navbar display from one MMU event and the
//! current filament list. No incremental updates: every event rebuilds
//! the whole [`DisplayState`], so stale regions can never leak through.

use crate::display::{DisplayOptions, DisplayState, NavIcon};
use prusammu_core::{
    lookup_error, lookup_progress, FilamentSlot, MmuEvent, MmuState, Protocol, ResponseCode,
};

/// Result of one derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    /// The navbar rendering.
    pub display: DisplayState,
    /// Set when the event references a tool with no matching slot.
    /// The session schedules a bounded retry off this flag.
    pub unresolved_tool: bool,
}

fn find_slot<'a>(slots: &'a [FilamentSlot], tool: Option<usize>) -> Option<&'a FilamentSlot> {
    tool.and_then(|index| slots.iter().find(|slot| slot.index == index))
}

fn slot_color(slot: &FilamentSlot) -> String {
    if slot.color.is_empty() {
        crate::display::INHERITED_COLOR.to_string()
    } else {
        slot.color.clone()
    }
}

/// Derive the navbar display for one event.
pub fn derive(event: &MmuEvent, slots: &[FilamentSlot], options: &DisplayOptions) -> Derivation {
    let current = find_slot(slots, event.tool);
    let previous = find_slot(slots, event.previous_tool);
    let unresolved_tool = (event.tool.is_some() && current.is_none())
        || (event.previous_tool.is_some() && previous.is_none());

    let mut display = DisplayState {
        visible: options.display_active_filament,
        ..DisplayState::default()
    };
    derive_action(event, current, previous, options, &mut display);
    derive_tools(event, current, previous, options, &mut display);
    derive_message(event, &mut display);

    if options.simple_display_mode {
        // Simple mode keeps the icons and colors but drops every label.
        display.action_text.clear();
        display.tool_text.clear();
        display.previous_tool_text.clear();
        display.message_text.clear();
    }

    // `display` can't be named inside the macro: tracing's expansion
    // `use`s `tracing::field::display`, which shadows the local.
    let action_text = &display.action_text;
    tracing::debug!(
        state = %event.state,
        tool = ?event.tool,
        unresolved = unresolved_tool,
        action = %action_text,
        "derived nav state"
    );

    Derivation {
        display,
        unresolved_tool,
    }
}

fn derive_action(
    event: &MmuEvent,
    current: Option<&FilamentSlot>,
    previous: Option<&FilamentSlot>,
    options: &DisplayOptions,
    display: &mut DisplayState,
) {
    let (text, icon) = match event.state {
        MmuState::NotFound => ("Not Found".to_string(), NavIcon::Times),
        MmuState::Starting => ("Starting...".to_string(), NavIcon::Spinner),
        MmuState::Ok => ("Ready".to_string(), NavIcon::Check),
        MmuState::Attention => ("Needs Attention!".to_string(), NavIcon::Warning),
        MmuState::PausedUser => ("Awaiting User Input!".to_string(), NavIcon::Fingerprint),
        MmuState::Unloading | MmuState::Loading => {
            // Both ends resolved means this is one tool-change operation.
            if current.is_some() && previous.is_some() {
                ("Changing Filament...".to_string(), NavIcon::None)
            } else if event.state == MmuState::Unloading {
                ("Unloading...".to_string(), NavIcon::None)
            } else {
                ("Loading...".to_string(), NavIcon::None)
            }
        }
        MmuState::LoadingMmu => ("Preloading Filament...".to_string(), NavIcon::None),
        MmuState::Cutting => ("Cutting Filament...".to_string(), NavIcon::None),
        MmuState::Ejecting => ("Ejecting Filament...".to_string(), NavIcon::None),
        MmuState::Loaded => match (current, event.tool) {
            (Some(slot), _) => (slot.display_name(options.index_at_zero), NavIcon::None),
            (None, Some(index)) => {
                let n = if options.index_at_zero { index } else { index + 1 };
                (format!("Filament {}", n), NavIcon::None)
            }
            (None, None) => ("Unknown".to_string(), NavIcon::Question),
        },
    };
    display.action_text = text;
    display.action_icon = icon;
}

fn derive_tools(
    event: &MmuEvent,
    current: Option<&FilamentSlot>,
    previous: Option<&FilamentSlot>,
    options: &DisplayOptions,
    display: &mut DisplayState,
) {
    if matches!(event.state, MmuState::Unloading | MmuState::Loading) {
        if let (Some(to), Some(from)) = (current, previous) {
            // The loading side owns the tool region, the unloading side
            // the previous-tool region, regardless of which verb the
            // firmware is currently reporting.
            display.tool_text = format!("Loading {}", to.display_name(options.index_at_zero));
            display.tool_color = slot_color(to);
            display.tool_icon = NavIcon::Loading;
            // The outgoing filament is advanced-mode detail.
            if options.advanced_display_mode {
                display.previous_tool_text =
                    format!("Unloading {}", from.display_name(options.index_at_zero));
                display.previous_tool_color = slot_color(from);
            }
            return;
        }
    }

    let (verb, icon) = match event.state {
        MmuState::Loaded => (None, NavIcon::Loaded),
        MmuState::Unloading => (Some("Unloading"), NavIcon::Unloading),
        MmuState::Loading => (Some("Loading"), NavIcon::Loading),
        MmuState::LoadingMmu => (Some("Preloading"), NavIcon::Preloading),
        MmuState::Cutting => (Some("Cutting"), NavIcon::Cutting),
        MmuState::Ejecting => (Some("Ejecting"), NavIcon::Ejecting),
        // No tool activity in the remaining states.
        _ => return,
    };

    if let Some(slot) = current {
        let name = slot.display_name(options.index_at_zero);
        display.tool_text = match verb {
            Some(verb) => format!("{} {}", verb, name),
            None => name,
        };
        display.tool_color = slot_color(slot);
        display.tool_icon = icon;
    }
}

fn derive_message(event: &MmuEvent, display: &mut DisplayState) {
    if event.protocol != Protocol::Extended {
        return;
    }
    let Some(response) = event.response else {
        return;
    };
    let data = event.response_data.as_deref().unwrap_or("");

    display.message_text = match response {
        ResponseCode::Processing => lookup_progress(data).to_string(),
        ResponseCode::Error => lookup_error(data).title.to_string(),
        ResponseCode::Accepted => "Starting".to_string(),
        ResponseCode::Rejected => "Command Rejected!".to_string(),
        // Finished and Button clear the message on purpose, a lingering
        // "done" line reads as stale state.
        ResponseCode::Finished | ResponseCode::Button => String::new(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use prusammu_core::placeholder_slots;

    fn named_slots() -> Vec<FilamentSlot> {
        let mut slots = placeholder_slots();
        slots[0].name = "Black".to_string();
        slots[0].color = "#000000".to_string();
        slots[2].name = "Orange".to_string();
        slots[2].color = "#ff8800".to_string();
        slots
    }

    fn event(state: MmuState) -> MmuEvent {
        MmuEvent {
            state,
            tool: None,
            previous_tool: None,
            response: None,
            response_data: None,
            protocol: Protocol::Legacy,
        }
    }

    #[test]
    fn test_ok_renders_check_and_blank_tools() {
        let derivation = derive(&event(MmuState::Ok), &named_slots(), &DisplayOptions::default());
        let display = derivation.display;
        assert_eq!(display.action_text, "Ready");
        assert_eq!(display.action_icon, NavIcon::Check);
        assert!(display.tool_text.is_empty());
        assert!(display.previous_tool_text.is_empty());
        assert!(!derivation.unresolved_tool);
    }

    #[test]
    fn test_unloading_with_both_resolved_is_a_change() {
        let mut ev = event(MmuState::Unloading);
        ev.tool = Some(2);
        ev.previous_tool = Some(0);
        let options = DisplayOptions {
            advanced_display_mode: true,
            ..DisplayOptions::default()
        };
        let display = derive(&ev, &named_slots(), &options).display;

        assert_eq!(display.action_text, "Changing Filament...");
        assert_eq!(display.tool_text, "Loading 3: Orange");
        assert_eq!(display.tool_icon, NavIcon::Loading);
        assert_eq!(display.previous_tool_text, "Unloading 1: Black");
        assert_eq!(display.previous_tool_color, "#000000");
    }

    #[test]
    fn test_previous_tool_detail_needs_advanced_mode() {
        let mut ev = event(MmuState::Unloading);
        ev.tool = Some(2);
        ev.previous_tool = Some(0);
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;

        assert_eq!(display.action_text, "Changing Filament...");
        assert_eq!(display.tool_text, "Loading 3: Orange");
        assert!(display.previous_tool_text.is_empty());
        assert_eq!(display.previous_tool_color, crate::display::INHERITED_COLOR);
    }

    #[test]
    fn test_unloading_alone_keeps_the_verb() {
        let mut ev = event(MmuState::Unloading);
        ev.tool = Some(2);
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;

        assert_eq!(display.action_text, "Unloading...");
        assert_eq!(display.tool_text, "Unloading 3: Orange");
        assert_eq!(display.tool_icon, NavIcon::Unloading);
    }

    #[test]
    fn test_loaded_shows_display_name() {
        let mut ev = event(MmuState::Loaded);
        ev.tool = Some(0);
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;

        assert_eq!(display.action_text, "1: Black");
        assert_eq!(display.action_icon, NavIcon::None);
        assert_eq!(display.tool_icon, NavIcon::Loaded);
        assert_eq!(display.tool_color, "#000000");
    }

    #[test]
    fn test_index_at_zero_shifts_labels() {
        let mut ev = event(MmuState::Loaded);
        ev.tool = Some(2);
        let options = DisplayOptions {
            index_at_zero: true,
            ..DisplayOptions::default()
        };
        let display = derive(&ev, &named_slots(), &options).display;
        assert_eq!(display.action_text, "2: Orange");
    }

    #[test]
    fn test_unresolved_tool_sets_retry_flag() {
        let mut ev = event(MmuState::Loaded);
        ev.tool = Some(3);
        let slots: Vec<FilamentSlot> = named_slots().into_iter().take(2).collect();
        let derivation = derive(&ev, &slots, &DisplayOptions::default());

        assert!(derivation.unresolved_tool);
        assert_eq!(derivation.display.action_text, "Filament 4");
    }

    #[test]
    fn test_unresolved_placeholder_respects_index_at_zero() {
        let mut ev = event(MmuState::Loaded);
        ev.tool = Some(3);
        let slots: Vec<FilamentSlot> = named_slots().into_iter().take(2).collect();
        let options = DisplayOptions {
            index_at_zero: true,
            ..DisplayOptions::default()
        };
        let derivation = derive(&ev, &slots, &options);

        assert!(derivation.unresolved_tool);
        assert_eq!(derivation.display.action_text, "Filament 3");
    }

    #[test]
    fn test_simple_mode_keeps_icons_drops_texts() {
        let mut ev = event(MmuState::Loaded);
        ev.tool = Some(0);
        let options = DisplayOptions {
            simple_display_mode: true,
            ..DisplayOptions::default()
        };
        let display = derive(&ev, &named_slots(), &options).display;

        assert!(display.action_text.is_empty());
        assert!(display.tool_text.is_empty());
        assert_eq!(display.tool_icon, NavIcon::Loaded);
        assert_eq!(display.tool_color, "#000000");
        assert!(display.visible);
    }

    #[test]
    fn test_display_active_filament_off_hides_the_region() {
        let options = DisplayOptions {
            display_active_filament: false,
            ..DisplayOptions::default()
        };
        let display = derive(&event(MmuState::Ok), &named_slots(), &options).display;

        assert!(!display.visible);
        // The derivation itself still runs so a re-enable is instant.
        assert_eq!(display.action_text, "Ready");
    }

    #[test]
    fn test_extended_messages() {
        let mut ev = event(MmuState::Loading);
        ev.protocol = Protocol::Extended;
        ev.response = Some(ResponseCode::Processing);
        ev.response_data = Some("5".to_string());
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;
        assert_eq!(display.message_text, "Feeding to FINDA");

        ev.response = Some(ResponseCode::Error);
        ev.response_data = Some("8001".to_string());
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;
        assert_eq!(display.message_text, "FINDA DIDNT TRIGGER");

        ev.response = Some(ResponseCode::Finished);
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;
        assert_eq!(display.message_text, "");

        ev.response = Some(ResponseCode::Rejected);
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;
        assert_eq!(display.message_text, "Command Rejected!");
    }

    #[test]
    fn test_legacy_protocol_never_renders_messages() {
        let mut ev = event(MmuState::Loading);
        ev.response = Some(ResponseCode::Error);
        ev.response_data = Some("8001".to_string());
        let display = derive(&ev, &named_slots(), &DisplayOptions::default()).display;
        assert_eq!(display.message_text, "");
    }

    #[test]
    fn test_attention_and_paused() {
        let display = derive(&event(MmuState::Attention), &[], &DisplayOptions::default()).display;
        assert_eq!(display.action_text, "Needs Attention!");
        assert_eq!(display.action_icon, NavIcon::Warning);

        let display = derive(&event(MmuState::PausedUser), &[], &DisplayOptions::default()).display;
        assert_eq!(display.action_text, "Awaiting User Input!");
        assert_eq!(display.action_icon, NavIcon::Fingerprint);
    }
}
