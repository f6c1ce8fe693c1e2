#![forbid(unsafe_code)]

use super::*;
use ql_core::{DEFAULT_PROFILE_IMAGE, ProfileName, SetupState};
use rusqlite::OptionalExtension;
use serde_json::json;

impl SqliteStore {
    /// Login upsert: returns the stored profile if `name` is known, else
    /// creates and persists a zero-progression profile.
    pub fn profile_create_or_load(&mut self, name: &ProfileName) -> Result<ProfileRow, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        if let Some(row) = load_profile(&tx, name.as_str())? {
            tx.commit()?;
            return Ok(row);
        }

        let progress = Progress::new();
        tx.execute(
            r#"
            INSERT INTO profiles(name, profile_image, class, race, setup_state, experience, level, gold, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, NULL, NULL, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                name.as_str(),
                DEFAULT_PROFILE_IMAGE,
                SetupState::Pending.as_str(),
                progress.experience,
                progress.level,
                progress.gold,
                now_ms,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            name.as_str(),
            now_ms,
            "profile_created",
            &json!({ "name": name.as_str() }).to_string(),
        )?;

        tx.commit()?;
        Ok(ProfileRow {
            name: name.as_str().to_string(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            class: None,
            race: None,
            setup_state: SetupState::Pending,
            experience: progress.experience,
            level: progress.level,
            gold: progress.gold,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn profile_get(&self, name: &ProfileName) -> Result<Option<ProfileRow>, StoreError> {
        load_profile(self.conn(), name.as_str())
    }

    /// One-shot class/race assignment. Fails once the profile is finalized.
    pub fn profile_finalize(
        &mut self,
        request: ProfileFinalizeRequest,
    ) -> Result<ProfileRow, StoreError> {
        let ProfileFinalizeRequest { name, class, race } = request;

        let class = class.trim().to_string();
        let race = race.trim().to_string();
        if class.is_empty() {
            return Err(StoreError::InvalidInput("class is empty"));
        }
        if race.is_empty() {
            return Err(StoreError::InvalidInput("race is empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let Some(row) = load_profile(&tx, name.as_str())? else {
            return Err(StoreError::UnknownProfile {
                name: name.as_str().to_string(),
            });
        };
        if row.setup_state == SetupState::Finalized {
            return Err(StoreError::ProfileAlreadyFinalized);
        }

        tx.execute(
            r#"
            UPDATE profiles
            SET class = ?2, race = ?3, setup_state = ?4, updated_at_ms = ?5
            WHERE name = ?1
            "#,
            params![
                name.as_str(),
                class,
                race,
                SetupState::Finalized.as_str(),
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            name.as_str(),
            now_ms,
            "profile_finalized",
            &json!({ "class": class, "race": race }).to_string(),
        )?;

        tx.commit()?;
        Ok(ProfileRow {
            class: Some(class),
            race: Some(race),
            setup_state: SetupState::Finalized,
            updated_at_ms: now_ms,
            ..row
        })
    }

    /// Cosmetic update, allowed any time (unlike class/race).
    pub fn profile_set_image(
        &mut self,
        name: &ProfileName,
        image: &str,
    ) -> Result<ProfileRow, StoreError> {
        let image = image.trim();
        if image.is_empty() {
            return Err(StoreError::InvalidInput("profile image is empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let Some(row) = load_profile(&tx, name.as_str())? else {
            return Err(StoreError::UnknownProfile {
                name: name.as_str().to_string(),
            });
        };

        tx.execute(
            "UPDATE profiles SET profile_image = ?2, updated_at_ms = ?3 WHERE name = ?1",
            params![name.as_str(), image, now_ms],
        )?;

        insert_event_tx(
            &tx,
            name.as_str(),
            now_ms,
            "profile_image_set",
            &json!({ "image": image }).to_string(),
        )?;

        tx.commit()?;
        Ok(ProfileRow {
            profile_image: image.to_string(),
            updated_at_ms: now_ms,
            ..row
        })
    }

    /// Adds experience, resolves level-ups, and persists the new counters in
    /// one transaction.
    pub fn profile_apply_reward(
        &mut self,
        name: &ProfileName,
        points: u32,
    ) -> Result<RewardOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let Some(row) = load_profile(&tx, name.as_str())? else {
            return Err(StoreError::UnknownProfile {
                name: name.as_str().to_string(),
            });
        };

        let before = row.progress();
        let mut after = before;
        let level_ups = after.apply_experience(points);

        tx.execute(
            r#"
            UPDATE profiles
            SET experience = ?2, level = ?3, gold = ?4, updated_at_ms = ?5
            WHERE name = ?1
            "#,
            params![
                name.as_str(),
                after.experience,
                after.level,
                after.gold,
                now_ms
            ],
        )?;

        insert_event_tx(
            &tx,
            name.as_str(),
            now_ms,
            "reward_applied",
            &json!({
                "points": points,
                "levels_gained": level_ups.levels_gained,
                "gold_earned": level_ups.gold_earned,
                "level": after.level,
            })
            .to_string(),
        )?;

        tx.commit()?;
        Ok(RewardOutcome {
            before,
            after,
            levels_gained: level_ups.levels_gained,
            gold_earned: level_ups.gold_earned,
        })
    }
}

fn load_profile(conn: &Connection, name: &str) -> Result<Option<ProfileRow>, StoreError> {
    let row = conn
        .query_row(
            r#"
            SELECT name, profile_image, class, race, setup_state, experience, level, gold, created_at_ms, updated_at_ms
            FROM profiles
            WHERE name = ?1
            "#,
            params![name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, u32>(6)?,
                    row.get::<_, u32>(7)?,
                    row.get::<_, i64>(8)?,
                    row.get::<_, i64>(9)?,
                ))
            },
        )
        .optional()?;

    let Some((name, profile_image, class, race, setup_state, experience, level, gold, created_at_ms, updated_at_ms)) =
        row
    else {
        return Ok(None);
    };

    let setup_state = SetupState::parse(&setup_state).ok_or(StoreError::CorruptRow {
        column: "profiles.setup_state",
    })?;

    Ok(Some(ProfileRow {
        name,
        profile_image,
        class,
        race,
        setup_state,
        experience,
        level,
        gold,
        created_at_ms,
        updated_at_ms,
    }))
}
