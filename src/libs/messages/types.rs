#[derive(Debug, Clone)]
pub enum Message {
    // === ENTRY MESSAGES ===
    EntryStarted(String, String), // short id, project
    EntryPaused(String),
    EntryResumed(String),
    EntryStopped(String, f64),
    EntryAdded(String, String),
    EntryDeleted(String),
    EntriesEdited(usize),
    NotesUpdated(usize, String),
    NoEntriesFound,
    NoRunningEntries,
    NoPausedEntries,
    StartMovedAcrossPause(String),

    // === PROJECT MESSAGES ===
    ProjectCreated(String),
    ProjectArchived(String),
    ProjectUnarchived(String),
    ProjectRenamed(String, String),
    ProjectDescriptionUpdated(String),
    ProjectBillableUpdated(String, bool),
    ProjectDeleted(String, usize),
    NoProjectsFound,

    // === SUMMARY MESSAGES ===
    SummaryHeader(String, String), // from, to
    SummaryEmpty,
    SummaryTotal(f64),

    // === SNAPSHOT MESSAGES ===
    SnapshotCreated(String),
    SnapshotRestored(String, usize),
    SnapshotsPurged(usize),
    NoSnapshotsFound,

    // === MIGRATION MESSAGES ===
    SchemaCreated(String),
    SchemaUpToDate(String),
    SchemaCurrentVersion(Option<String>),
    MigrationStarted(String, String), // from, to
    MigrationSnapshotTaken(String),
    MigrationBackfilled(usize),
    MigrationCompleted(String),
    MigrationRepairingIndex,
    MigrationIgnoredDiagnostic(String, String), // step, diagnostic
    MigrationFailed(String, String),            // step, error

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigTimezoneSet(String),
}
