#![forbid(unsafe_code)]

use super::*;
use ql_core::ProfileName;
use rusqlite::OptionalExtension;
use serde_json::json;

impl SqliteStore {
    /// Inserts a new open task for `owner` and returns the stored row with
    /// its generated id. The owner profile must already exist.
    pub fn task_create(&mut self, request: TaskCreateRequest) -> Result<TaskRow, StoreError> {
        let TaskCreateRequest {
            owner,
            name,
            difficulty,
            due_date,
        } = request;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("task name is empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        ensure_profile_exists_tx(&tx, &owner)?;

        let due_date = due_date.to_string();
        tx.execute(
            r#"
            INSERT INTO tasks(name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                name,
                difficulty.as_str(),
                due_date,
                TaskStatus::Open.as_str(),
                owner.as_str(),
                now_ms,
                now_ms
            ],
        )?;
        let id = tx.last_insert_rowid();

        insert_event_tx(
            &tx,
            owner.as_str(),
            now_ms,
            "task_created",
            &json!({
                "id": id,
                "name": name,
                "difficulty": difficulty.as_str(),
                "due_date": due_date,
            })
            .to_string(),
        )?;

        tx.commit()?;
        Ok(TaskRow {
            id,
            name,
            difficulty: difficulty.as_str().to_string(),
            due_date,
            status: TaskStatus::Open,
            owner_name: owner.as_str().to_string(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    /// Edits an open task in place. Done tasks are frozen, so resolution is
    /// scoped to open tasks the same way completion is.
    pub fn task_update(&mut self, request: TaskUpdateRequest) -> Result<TaskRow, StoreError> {
        let TaskUpdateRequest {
            owner,
            id,
            name,
            difficulty,
            due_date,
        } = request;

        if name.is_none() && difficulty.is_none() && due_date.is_none() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }
        let name = name.map(|name| name.trim().to_string());
        if name.as_deref() == Some("") {
            return Err(StoreError::InvalidInput("task name is empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let raw = tx
            .query_row(
                r#"
                SELECT id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms
                FROM tasks
                WHERE owner_name = ?1 AND id = ?2 AND status = ?3
                "#,
                params![owner.as_str(), id, TaskStatus::Open.as_str()],
                map_task_row,
            )
            .optional()?;
        let Some(raw) = raw else {
            return Err(StoreError::TaskNotFound);
        };
        let row = finish_task_row(raw)?;

        let new_name = name.unwrap_or_else(|| row.name.clone());
        let new_difficulty =
            difficulty.map_or_else(|| row.difficulty.clone(), |tier| tier.as_str().to_string());
        let new_due_date = due_date.map_or_else(|| row.due_date.clone(), |due| due.to_string());

        tx.execute(
            r#"
            UPDATE tasks
            SET name = ?3, difficulty = ?4, due_date = ?5, updated_at_ms = ?6
            WHERE owner_name = ?1 AND id = ?2
            "#,
            params![owner.as_str(), id, new_name, new_difficulty, new_due_date, now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner.as_str(),
            now_ms,
            "task_updated",
            &json!({
                "id": id,
                "name": new_name,
                "difficulty": new_difficulty,
                "due_date": new_due_date,
            })
            .to_string(),
        )?;

        tx.commit()?;
        Ok(TaskRow {
            name: new_name,
            difficulty: new_difficulty,
            due_date: new_due_date,
            updated_at_ms: now_ms,
            ..row
        })
    }

    /// All of `owner`'s tasks in the given status, in insertion order.
    pub fn task_list(
        &self,
        owner: &ProfileName,
        status: TaskStatus,
    ) -> Result<Vec<TaskRow>, StoreError> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms
            FROM tasks
            WHERE owner_name = ?1 AND status = ?2
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![owner.as_str(), status.as_str()], map_task_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(finish_task_row(row?)?);
        }
        Ok(tasks)
    }

    pub fn task_get(&self, owner: &ProfileName, id: i64) -> Result<Option<TaskRow>, StoreError> {
        let raw = self
            .conn()
            .query_row(
                r#"
                SELECT id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms
                FROM tasks
                WHERE owner_name = ?1 AND id = ?2
                "#,
                params![owner.as_str(), id],
                map_task_row,
            )
            .optional()?;
        raw.map(finish_task_row).transpose()
    }

    /// Marks an open task done and returns the updated row. Resolution is
    /// scoped to open tasks, so completing a task twice fails with
    /// `TaskNotFound`.
    pub fn task_complete(&mut self, owner: &ProfileName, id: i64) -> Result<TaskRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let raw = tx
            .query_row(
                r#"
                SELECT id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms
                FROM tasks
                WHERE owner_name = ?1 AND id = ?2 AND status = ?3
                "#,
                params![owner.as_str(), id, TaskStatus::Open.as_str()],
                map_task_row,
            )
            .optional()?;
        let Some(raw) = raw else {
            return Err(StoreError::TaskNotFound);
        };
        let row = finish_task_row(raw)?;

        tx.execute(
            "UPDATE tasks SET status = ?3, updated_at_ms = ?4 WHERE owner_name = ?1 AND id = ?2",
            params![owner.as_str(), id, TaskStatus::Done.as_str(), now_ms],
        )?;

        insert_event_tx(
            &tx,
            owner.as_str(),
            now_ms,
            "task_completed",
            &json!({ "id": id, "name": row.name, "difficulty": row.difficulty }).to_string(),
        )?;

        tx.commit()?;
        Ok(TaskRow {
            status: TaskStatus::Done,
            updated_at_ms: now_ms,
            ..row
        })
    }

    /// Removes a task permanently, from either status.
    pub fn task_delete(&mut self, owner: &ProfileName, id: i64) -> Result<TaskRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let raw = tx
            .query_row(
                r#"
                SELECT id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms
                FROM tasks
                WHERE owner_name = ?1 AND id = ?2
                "#,
                params![owner.as_str(), id],
                map_task_row,
            )
            .optional()?;
        let Some(raw) = raw else {
            return Err(StoreError::TaskNotFound);
        };
        let row = finish_task_row(raw)?;

        tx.execute(
            "DELETE FROM tasks WHERE owner_name = ?1 AND id = ?2",
            params![owner.as_str(), id],
        )?;

        insert_event_tx(
            &tx,
            owner.as_str(),
            now_ms,
            "task_deleted",
            &json!({ "id": id, "name": row.name }).to_string(),
        )?;

        tx.commit()?;
        Ok(row)
    }

    /// Shell-side convenience: resolves a task name to the id of the first
    /// (lowest-id) open match. The mutation API itself is id-only.
    pub fn task_find_open_by_name(
        &self,
        owner: &ProfileName,
        name: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(self
            .conn()
            .query_row(
                r#"
                SELECT id FROM tasks
                WHERE owner_name = ?1 AND name = ?2 AND status = ?3
                ORDER BY id ASC
                LIMIT 1
                "#,
                params![owner.as_str(), name.trim(), TaskStatus::Open.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?)
    }
}

type RawTaskRow = (i64, String, String, String, String, String, i64, i64);

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTaskRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn finish_task_row(raw: RawTaskRow) -> Result<TaskRow, StoreError> {
    let (id, name, difficulty, due_date, status, owner_name, created_at_ms, updated_at_ms) = raw;
    let status = TaskStatus::parse(&status).ok_or(StoreError::CorruptRow {
        column: "tasks.status",
    })?;
    Ok(TaskRow {
        id,
        name,
        difficulty,
        due_date,
        status,
        owner_name,
        created_at_ms,
        updated_at_ms,
    })
}

fn ensure_profile_exists_tx(tx: &Transaction<'_>, owner: &ProfileName) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM profiles WHERE name = ?1",
            params![owner.as_str()],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !exists {
        return Err(StoreError::UnknownProfile {
            name: owner.as_str().to_string(),
        });
    }
    Ok(())
}
