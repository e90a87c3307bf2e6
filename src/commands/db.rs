use crate::commands::fixtures::{community_reports, fixture_details, viewer_reports};
use crate::models::report::{
    Category, Priority, Report, ReportDetail, ReportStatus, StatusUpdate, Vote,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::collections::HashSet;

const DB_SCHEMA_VERSION: i64 = 3;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 3 {
        apply_migration_3(conn)?;
        version = 3;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        log::warn!("report store schema v{version} is newer than v{DB_SCHEMA_VERSION}");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('pending', 'acknowledged', 'resolved', 'rejected')) DEFAULT 'pending',
            location TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            upvotes INTEGER NOT NULL DEFAULT 0 CHECK(upvotes >= 0),
            downvotes INTEGER NOT NULL DEFAULT 0 CHECK(downvotes >= 0),
            user_vote TEXT CHECK(user_vote IN ('up', 'down')),
            owned_by_viewer INTEGER NOT NULL DEFAULT 0,
            reported_by TEXT NOT NULL DEFAULT 'Anonymous Citizen',
            priority TEXT NOT NULL CHECK(priority IN ('low', 'medium', 'high')) DEFAULT 'medium',
            estimated_resolution TEXT
        );

        CREATE TABLE IF NOT EXISTS report_images (
            report_id TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            url TEXT NOT NULL,
            PRIMARY KEY (report_id, position)
        );

        CREATE TABLE IF NOT EXISTS status_updates (
            report_id TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            message TEXT NOT NULL,
            authority TEXT NOT NULL,
            recorded_at INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (report_id, position)
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "reports", "image_url TEXT")?;

    // Thumbnail defaults to the first attached image.
    conn.execute(
        "UPDATE reports SET image_url = (
            SELECT url FROM report_images
            WHERE report_images.report_id = reports.id
            ORDER BY position ASC LIMIT 1
        ) WHERE image_url IS NULL",
        [],
    )?;

    Ok(())
}

fn apply_migration_3(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_reports_owned ON reports(owned_by_viewer);
        CREATE INDEX IF NOT EXISTS idx_status_updates_report ON status_updates(report_id);
        ",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn open_report_store() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize_schema(&conn)?;
    seed_fixtures(&conn)?;
    Ok(conn)
}

pub fn seed_fixtures(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let owned: HashSet<String> = viewer_reports().into_iter().map(|r| r.id).collect();
    let community = community_reports().len();

    let tx = conn.unchecked_transaction()?;
    for detail in fixture_details() {
        let mine = owned.contains(&detail.report.id);
        insert_report_with_conn(&tx, &detail, mine)?;
    }
    tx.commit()?;

    log::debug!("seeded report store: {community} community, {} viewer", owned.len());
    Ok(())
}

pub fn insert_report(conn: &Connection, detail: &ReportDetail, owned_by_viewer: bool) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    insert_report_with_conn(&tx, detail, owned_by_viewer)?;
    tx.commit()
}

fn insert_report_with_conn(conn: &Connection, detail: &ReportDetail, owned_by_viewer: bool) -> Result<()> {
    let report = &detail.report;
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO reports (id, title, description, status, location, date, category, upvotes, downvotes, user_vote, owned_by_viewer, reported_by, priority, estimated_resolution, image_url) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            &report.id,
            &report.title,
            &report.description,
            report.status.as_str(),
            &report.location,
            &report.date,
            report.category.label(),
            report.upvotes,
            report.downvotes,
            report.user_vote.map(Vote::as_str),
            owned_by_viewer as i32,
            &detail.reported_by,
            detail.priority.as_str(),
            detail.estimated_resolution.as_deref(),
            report.image_url.as_deref(),
        ],
    )?;

    for (position, url) in detail.images.iter().enumerate() {
        conn.execute(
            "INSERT INTO report_images (report_id, position, url) VALUES (?1, ?2, ?3)",
            params![&report.id, position as i64, url],
        )?;
    }

    for (position, update) in detail.updates.iter().enumerate() {
        conn.execute(
            "INSERT INTO status_updates (report_id, position, date, status, message, authority, recorded_at) VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                &report.id,
                position as i64,
                &update.date,
                update.status.as_str(),
                &update.message,
                &update.authority,
                now,
            ],
        )?;
    }

    Ok(())
}

fn conversion_error(index: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        format!("unexpected value {value:?}").into(),
    )
}

fn parse_with<T>(row: &Row<'_>, index: usize, parse: impl Fn(&str) -> Option<T>) -> Result<T> {
    let raw: String = row.get(index)?;
    parse(&raw).ok_or_else(|| conversion_error(index, &raw))
}

const REPORT_COLUMNS: &str =
    "id, title, description, status, location, date, category, upvotes, downvotes, user_vote, image_url";

fn report_from_row(row: &Row<'_>) -> Result<Report> {
    let user_vote = match row.get::<_, Option<String>>(9)? {
        Some(raw) => Some(Vote::from_name(&raw).ok_or_else(|| conversion_error(9, &raw))?),
        None => None,
    };

    Ok(Report {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_with(row, 3, ReportStatus::from_name)?,
        location: row.get(4)?,
        date: row.get(5)?,
        category: parse_with(row, 6, Category::from_label)?,
        upvotes: row.get(7)?,
        downvotes: row.get(8)?,
        user_vote,
        image_url: row.get(10)?,
    })
}

pub fn load_reports(conn: &Connection, owned_by_viewer: bool) -> Result<Vec<Report>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE owned_by_viewer = ?1 ORDER BY rowid ASC"
    ))?;

    let reports = stmt
        .query_map(params![owned_by_viewer as i32], report_from_row)?
        .collect::<Result<Vec<_>>>()?;

    Ok(reports)
}

pub fn load_report_detail(conn: &Connection, id: &str) -> Result<Option<ReportDetail>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {REPORT_COLUMNS}, reported_by, priority, estimated_resolution FROM reports WHERE id = ?1"
            ),
            params![id],
            |row| {
                Ok((
                    report_from_row(row)?,
                    row.get::<_, String>(11)?,
                    parse_with(row, 12, Priority::from_name)?,
                    row.get::<_, Option<String>>(13)?,
                ))
            },
        )
        .optional()?;

    let Some((report, reported_by, priority, estimated_resolution)) = row else {
        return Ok(None);
    };

    let mut stmt =
        conn.prepare("SELECT url FROM report_images WHERE report_id = ?1 ORDER BY position ASC")?;
    let images = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT date, status, message, authority FROM status_updates WHERE report_id = ?1 ORDER BY position ASC",
    )?;
    let updates = stmt
        .query_map(params![id], |row| {
            Ok(StatusUpdate {
                date: row.get(0)?,
                status: parse_with(row, 1, ReportStatus::from_name)?,
                message: row.get(2)?,
                authority: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ReportDetail {
        report,
        reported_by,
        priority,
        estimated_resolution,
        images,
        updates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::submitted_update;

    #[test]
    fn schema_initializes_with_expected_version() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("schema init");
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn seeded_store_splits_community_and_viewer_reports() {
        let conn = open_report_store().expect("store");
        let community = load_reports(&conn, false).expect("community");
        let mine = load_reports(&conn, true).expect("mine");

        assert_eq!(community, community_reports());
        assert_eq!(mine, viewer_reports());

        // Seeding twice is a no-op.
        seed_fixtures(&conn).expect("reseed");
        assert_eq!(load_reports(&conn, false).expect("community").len(), 4);
    }

    #[test]
    fn detail_round_trip_preserves_history_order() {
        let conn = open_report_store().expect("store");
        let detail = load_report_detail(&conn, "1")
            .expect("load detail")
            .expect("detail exists");

        assert_eq!(detail.priority, Priority::High);
        assert_eq!(detail.images.len(), 2);
        assert_eq!(detail.updates.len(), 2);
        assert_eq!(detail.updates[0].status, ReportStatus::Acknowledged);
        assert_eq!(detail.updates[1], submitted_update("2 days ago"));

        assert!(load_report_detail(&conn, "missing").expect("query").is_none());
    }
}
