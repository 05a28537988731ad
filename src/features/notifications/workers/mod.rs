mod notification_scheduler;

pub use notification_scheduler::NotificationScheduler;
