//! Session snapshot save and load queries.
//!
//! A snapshot is the full evaluation state: the frozen store, the mask
//! registry in registration order and the evaluation config. Saving
//! replaces any previous snapshot in the same database wholesale;
//! loading reassembles a ready [`Session`].

use std::time::Instant;

use ndarray::{Array1, Array3};
use rusqlite::{params, Connection, Transaction};

use concord_analysis::masks::{Mask, MaskRegistry};
use concord_analysis::session::Session;
use concord_analysis::store::{
    AssignmentMeta, RatingStore, SnapshotRating, StoreSnapshot, SubmissionState,
};
use concord_core::config::EvalConfig;
use concord_core::errors::StorageError;
use concord_core::types::MaskKind;

/// Write the whole session into the database, replacing any previous
/// snapshot.
pub fn save_session(conn: &Connection, session: &Session) -> Result<(), StorageError> {
    let started = Instant::now();
    let snapshot = session.store().to_snapshot();

    let config_json =
        serde_json::to_string(session.config()).map_err(|e| StorageError::Sqlite {
            message: format!("failed to serialize config: {e}"),
        })?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;

    // Children before parents, for the foreign keys.
    tx.execute_batch(
        "DELETE FROM session_info;
         DELETE FROM masks;
         DELETE FROM ratings;
         DELETE FROM assignments;
         DELETE FROM rating_names;
         DELETE FROM workers;
         DELETE FROM files;
         DELETE FROM algorithms;",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;

    insert_names(
        &tx,
        "INSERT INTO algorithms (position, name) VALUES (?1, ?2)",
        &snapshot.algorithms,
    )?;
    insert_names(
        &tx,
        "INSERT INTO files (position, name) VALUES (?1, ?2)",
        &snapshot.files,
    )?;
    insert_names(
        &tx,
        "INSERT INTO workers (position, name) VALUES (?1, ?2)",
        &snapshot.workers,
    )?;
    insert_names(
        &tx,
        "INSERT INTO rating_names (position, name) VALUES (?1, ?2)",
        &snapshot.rating_names,
    )?;

    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO assignments
                     (position, name, worker, device, state, submitted_at, work_duration_secs)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for (position, name) in snapshot.assignments.iter().enumerate() {
            let meta = &snapshot.metas[position];
            stmt.execute(params![
                position as i64,
                name,
                snapshot.assignment_workers[position] as i64,
                meta.device,
                meta.state.name(),
                meta.submitted_at,
                meta.work_duration_secs as i64,
            ])
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        }
    }

    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO ratings (position, assignment, algorithm, file, rating_name, vote)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for (position, rating) in snapshot.ratings.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                rating.assignment as i64,
                rating.algorithm as i64,
                rating.file as i64,
                rating.rating_name as i64,
                rating.vote,
            ])
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        }
    }

    {
        let mut stmt = tx
            .prepare_cached("INSERT INTO masks (position, name, kind, flags) VALUES (?1, ?2, ?3, ?4)")
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for (position, (name, mask)) in session.registry().iter().enumerate() {
            stmt.execute(params![
                position as i64,
                name,
                mask.kind().name(),
                mask_bytes(mask),
            ])
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        }
    }

    tx.execute(
        "INSERT INTO session_info (id, config_json) VALUES (0, ?1)",
        params![config_json],
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;

    tx.commit().map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;

    tracing::info!(
        algorithms = snapshot.algorithms.len(),
        workers = snapshot.workers.len(),
        files = snapshot.files.len(),
        assignments = snapshot.assignments.len(),
        ratings = snapshot.ratings.len(),
        masks = session.registry().len(),
        snapshot_write_time = started.elapsed().as_millis() as u64,
        "session snapshot saved"
    );
    Ok(())
}

/// Reassemble a [`Session`] from the snapshot in the database.
pub fn load_session(conn: &Connection) -> Result<Session, StorageError> {
    let started = Instant::now();

    let config_json: String = {
        let mut stmt = conn
            .prepare_cached("SELECT config_json FROM session_info WHERE id = 0")
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        stmt.query_row([], |row| row.get(0)).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::IncompleteSnapshot {
                message: "no saved session in this database".to_string(),
            },
            other => StorageError::Sqlite {
                message: other.to_string(),
            },
        })?
    };
    let config: EvalConfig =
        serde_json::from_str(&config_json).map_err(|e| StorageError::DbCorrupt {
            message: format!("config_json does not parse: {e}"),
        })?;

    let algorithms = load_names(conn, "SELECT name FROM algorithms ORDER BY position")?;
    let files = load_names(conn, "SELECT name FROM files ORDER BY position")?;
    let workers = load_names(conn, "SELECT name FROM workers ORDER BY position")?;
    let rating_names = load_names(conn, "SELECT name FROM rating_names ORDER BY position")?;

    let mut assignments = Vec::new();
    let mut assignment_workers = Vec::new();
    let mut metas = Vec::new();
    {
        let mut stmt = conn
            .prepare_cached(
                "SELECT name, worker, device, state, submitted_at, work_duration_secs
                 FROM assignments ORDER BY position",
            )
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for row in rows {
            let (name, worker, device, state, submitted_at, work_duration_secs) =
                row.map_err(|e| StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            let parsed = SubmissionState::parse(&state).ok_or_else(|| StorageError::DbCorrupt {
                message: format!("assignment {name:?} has unknown state {state:?}"),
            })?;
            assignments.push(name);
            assignment_workers.push(worker as usize);
            metas.push(AssignmentMeta {
                device,
                state: parsed,
                submitted_at,
                work_duration_secs: work_duration_secs as u64,
            });
        }
    }

    let mut ratings = Vec::new();
    {
        let mut stmt = conn
            .prepare_cached(
                "SELECT assignment, algorithm, file, rating_name, vote
                 FROM ratings ORDER BY position",
            )
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SnapshotRating {
                    assignment: row.get::<_, i64>(0)? as usize,
                    algorithm: row.get::<_, i64>(1)? as usize,
                    file: row.get::<_, i64>(2)? as usize,
                    rating_name: row.get::<_, i64>(3)? as usize,
                    vote: row.get(4)?,
                })
            })
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for row in rows {
            ratings.push(row.map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?);
        }
    }

    let store = RatingStore::from_snapshot(StoreSnapshot {
        algorithms,
        files,
        workers,
        assignments,
        rating_names,
        assignment_workers,
        metas,
        ratings,
    })
    .map_err(|e| StorageError::DbCorrupt {
        message: e.to_string(),
    })?;

    let mut registry = MaskRegistry::new();
    {
        let mut stmt = conn
            .prepare_cached("SELECT name, kind, flags FROM masks ORDER BY position")
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            })
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
        for row in rows {
            let (name, kind, bytes) = row.map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
            let mask_kind = MaskKind::parse(&kind).ok_or_else(|| StorageError::DbCorrupt {
                message: format!("mask {name:?} has unknown kind {kind:?}"),
            })?;
            let mask = mask_from_bytes(&name, mask_kind, &bytes, &store)?;
            registry.register(&name, mask);
        }
    }

    let masks = registry.len();
    let session = Session::from_parts(store, registry, config);

    tracing::info!(
        algorithms = session.store().n_algorithms(),
        workers = session.store().n_workers(),
        files = session.store().n_files(),
        assignments = session.store().n_assignments(),
        ratings = session.store().ratings().len(),
        masks = masks,
        snapshot_load_time = started.elapsed().as_millis() as u64,
        "session snapshot loaded"
    );
    Ok(session)
}

fn insert_names(
    tx: &Transaction<'_>,
    sql: &str,
    names: &[String],
) -> Result<(), StorageError> {
    let mut stmt = tx.prepare_cached(sql).map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;
    for (position, name) in names.iter().enumerate() {
        stmt.execute(params![position as i64, name])
            .map_err(|e| StorageError::Sqlite {
                message: e.to_string(),
            })?;
    }
    Ok(())
}

fn load_names(conn: &Connection, sql: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;

    let mut names = Vec::new();
    for row in rows {
        names.push(row.map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?);
    }
    Ok(names)
}

/// One 0/1 byte per flag, in row-major tensor order.
fn mask_bytes(mask: &Mask) -> Vec<u8> {
    match mask {
        Mask::Rating(flags) => flags.iter().map(|&flag| flag as u8).collect(),
        Mask::Assignment(flags) | Mask::Worker(flags) => {
            flags.iter().map(|&flag| flag as u8).collect()
        }
    }
}

fn mask_from_bytes(
    name: &str,
    kind: MaskKind,
    bytes: &[u8],
    store: &RatingStore,
) -> Result<Mask, StorageError> {
    let expected = match kind {
        MaskKind::Rating => {
            let (algorithms, workers, files) = store.tensor_shape();
            algorithms * workers * files
        }
        MaskKind::Assignment => store.n_assignments(),
        MaskKind::Worker => store.n_workers(),
    };
    if bytes.len() != expected {
        return Err(StorageError::DbCorrupt {
            message: format!(
                "mask {name:?} has {} flag bytes, expected {expected}",
                bytes.len()
            ),
        });
    }

    let flags: Vec<bool> = bytes.iter().map(|&byte| byte != 0).collect();
    let mask = match kind {
        MaskKind::Rating => Array3::from_shape_vec(store.tensor_shape(), flags)
            .map(Mask::Rating)
            .map_err(|e| StorageError::DbCorrupt {
                message: e.to_string(),
            })?,
        MaskKind::Assignment => Mask::Assignment(Array1::from(flags)),
        MaskKind::Worker => Mask::Worker(Array1::from(flags)),
    };
    Ok(mask)
}
