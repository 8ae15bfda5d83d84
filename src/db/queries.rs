use rusqlite::{params, Connection, OptionalExtension};

pub fn get_slot(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM slots WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

pub fn put_slot(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO slots (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_slot(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM slots WHERE key = ?1", params![key])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_slot_roundtrip() {
        let conn = db::init_db(":memory:").unwrap();
        assert!(get_slot(&conn, "draft").unwrap().is_none());

        put_slot(&conn, "draft", r#"{"a":1}"#).unwrap();
        assert_eq!(get_slot(&conn, "draft").unwrap().unwrap(), r#"{"a":1}"#);

        put_slot(&conn, "draft", r#"{"a":2}"#).unwrap();
        assert_eq!(get_slot(&conn, "draft").unwrap().unwrap(), r#"{"a":2}"#);

        delete_slot(&conn, "draft").unwrap();
        assert!(get_slot(&conn, "draft").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_slot_is_noop() {
        let conn = db::init_db(":memory:").unwrap();
        delete_slot(&conn, "nope").unwrap();
    }
}
