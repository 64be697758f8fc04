pub mod error;
pub mod ledger;
pub mod reminders;
pub mod server;
pub mod storage;

pub use error::{CoreError, CoreResult};
pub use ledger::{RecyclingStats, ScanLedger, ScanMode, ScanRecord};
pub use reminders::{Frequency, Reminder, ReminderBook, ReminderDraft, ReminderKind};
pub use server::Server;
pub use storage::{file::FileStorage, memory::MemoryStorage, SharedStorage, Storage};
