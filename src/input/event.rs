/// Application-level events (commands/actions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // App control
    Quit,

    // File operations
    OpenFile,
    Save,
    SaveAs,
    CloseTab,
    RemoveFile,
    Refresh,
    /// List loaded files to reopen or close one
    ShowFiles,

    // Tabs
    NextTab,
    PreviousTab,
    GoToTab(u8),
    ToggleView,

    // Row selection in the active table
    SelectUp,
    SelectDown,
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,
}
