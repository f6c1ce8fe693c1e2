#![forbid(unsafe_code)]

use super::*;
use ql_core::ProfileName;

impl SqliteStore {
    /// Journal entries for `owner` after `since_seq`, oldest first.
    pub fn events_list(
        &self,
        owner: &ProfileName,
        since_seq: i64,
        limit: usize,
    ) -> Result<Vec<EventRow>, StoreError> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT seq, ts_ms, owner_name, type, payload_json
            FROM events
            WHERE owner_name = ?1 AND seq > ?2
            ORDER BY seq ASC
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), since_seq, limit as i64], |row| {
            Ok(EventRow {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                owner_name: row.get(2)?,
                event_type: row.get(3)?,
                payload_json: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The newest `limit` journal entries for `owner`, oldest first, so a
    /// capped history view always shows recent activity.
    pub fn events_tail(
        &self,
        owner: &ProfileName,
        limit: usize,
    ) -> Result<Vec<EventRow>, StoreError> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT seq, ts_ms, owner_name, type, payload_json
            FROM events
            WHERE owner_name = ?1
            ORDER BY seq DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), limit as i64], |row| {
            Ok(EventRow {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                owner_name: row.get(2)?,
                event_type: row.get(3)?,
                payload_json: row.get(4)?,
            })
        })?;
        let mut events = rows.collect::<Result<Vec<_>, _>>()?;
        events.reverse();
        Ok(events)
    }
}
