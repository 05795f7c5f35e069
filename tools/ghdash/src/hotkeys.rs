#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: char,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Quit,
    NextTab,
    PrevTab,
}

pub const DASHBOARD_BINDINGS: [HotkeyBinding; 3] = [
    HotkeyBinding {
        key: 'q',
        action: "quit",
    },
    HotkeyBinding {
        key: ']',
        action: "next tab",
    },
    HotkeyBinding {
        key: '[',
        action: "prev tab",
    },
];

pub fn action_for_key(key: char) -> Option<HotkeyAction> {
    match key {
        'q' => Some(HotkeyAction::Quit),
        ']' => Some(HotkeyAction::NextTab),
        '[' => Some(HotkeyAction::PrevTab),
        _ => None,
    }
}

pub fn controls_legend() -> String {
    let parts = DASHBOARD_BINDINGS
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("Keys: {}", parts.join("  "))
}
