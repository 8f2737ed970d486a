//! Event log schema, embedded at compile time
//!
//! Each entry is (file name, SQL). Entries are applied in order and
//! recorded in `sys_migrations`; add new files as `NNN_description.sql`
//! and append them here.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
