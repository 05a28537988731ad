/// Message returned with HTTP 409 when an appointment overlaps existing ones
pub const APPOINTMENT_CONFLICT_MESSAGE: &str = "Appointment conflicts with existing events";

/// Categories every fresh agenda starts with: (name, color)
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Work", "#1976D2"),
    ("Personal", "#4CAF50"),
    ("Health", "#FF9800"),
    ("Social", "#9C27B0"),
];

/// How far ahead of an appointment's start its reminder is sent
pub const REMINDER_LOOKAHEAD_MINUTES: i64 = 30;
