use crate::errors::TrackerError;
use crate::habits::DailyRecord;
use crate::progress::{Habits, Sessions};
use crate::sessions::WorkoutSession;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock, RwLockReadGuard};
use tracing::{debug, error, info};

const HABITS_DIR: &str = "habits";
const SESSIONS_DIR: &str = "sessions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RecordKey {
    Habit(NaiveDate),
    Session(NaiveDate, u32),
}

impl RecordKey {
    fn file_name(self) -> String {
        match self {
            Self::Habit(date) => format!("{date}.json"),
            Self::Session(date, day) => format!("{date}_day{day}.json"),
        }
    }

    fn dir(self) -> &'static str {
        match self {
            Self::Habit(_) => HABITS_DIR,
            Self::Session(..) => SESSIONS_DIR,
        }
    }
}

// One async lock per record key. Entries nobody holds or waits on are
// dropped on the next acquire.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<RecordKey, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    async fn acquire(&self, key: RecordKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct Store {
    root: Option<PathBuf>,
    habits: RwLock<Habits>,
    sessions: RwLock<Sessions>,
    locks: KeyLocks,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            root: None,
            habits: RwLock::default(),
            sessions: RwLock::default(),
            locks: KeyLocks::default(),
        }
    }

    pub async fn open(root: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(HABITS_DIR)).await?;
        fs::create_dir_all(root.join(SESSIONS_DIR)).await?;

        let habits: Habits = load_dir::<DailyRecord>(&root.join(HABITS_DIR))
            .await?
            .into_iter()
            .map(|mut record| {
                record.refresh();
                (record.date, record)
            })
            .collect();
        let sessions: Sessions = load_dir::<WorkoutSession>(&root.join(SESSIONS_DIR))
            .await?
            .into_iter()
            .map(|mut session| {
                session.refresh();
                ((session.date, session.day), session)
            })
            .collect();

        info!(
            habits = habits.len(),
            sessions = sessions.len(),
            "loaded store from {}",
            root.display()
        );

        Ok(Self {
            root: Some(root),
            habits: RwLock::new(habits),
            sessions: RwLock::new(sessions),
            locks: KeyLocks::default(),
        })
    }

    pub async fn habit(&self, date: NaiveDate) -> Option<DailyRecord> {
        self.habits.read().await.get(&date).cloned()
    }

    pub async fn session(&self, date: NaiveDate, day: u32) -> Option<WorkoutSession> {
        self.sessions.read().await.get(&(date, day)).cloned()
    }

    pub async fn read_habits(&self) -> RwLockReadGuard<'_, Habits> {
        self.habits.read().await
    }

    // Lock order is habits, then sessions.
    pub async fn read_all(
        &self,
    ) -> (RwLockReadGuard<'_, Habits>, RwLockReadGuard<'_, Sessions>) {
        let habits = self.habits.read().await;
        let sessions = self.sessions.read().await;
        (habits, sessions)
    }

    // The file is written before the map is updated; a failed write changes nothing.
    pub async fn update_habit<F>(
        &self,
        date: NaiveDate,
        change: F,
    ) -> Result<DailyRecord, TrackerError>
    where
        F: FnOnce(DailyRecord) -> Result<DailyRecord, TrackerError>,
    {
        let key = RecordKey::Habit(date);
        let _guard = self.locks.acquire(key).await;

        let current = self
            .habit(date)
            .await
            .unwrap_or_else(|| DailyRecord::new(date));
        let next = change(current)?;
        self.persist(key, &next).await?;
        self.habits.write().await.insert(date, next.clone());
        Ok(next)
    }

    pub async fn update_session<S, F>(
        &self,
        date: NaiveDate,
        day: u32,
        seed: S,
        change: F,
    ) -> Result<WorkoutSession, TrackerError>
    where
        S: FnOnce() -> WorkoutSession,
        F: FnOnce(WorkoutSession) -> Result<WorkoutSession, TrackerError>,
    {
        let key = RecordKey::Session(date, day);
        let _guard = self.locks.acquire(key).await;

        let current = self.session(date, day).await.unwrap_or_else(seed);
        let next = change(current)?;
        self.persist(key, &next).await?;
        self.sessions.write().await.insert((date, day), next.clone());
        Ok(next)
    }

    async fn persist<T: Serialize>(&self, key: RecordKey, value: &T) -> Result<(), TrackerError> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let payload = serde_json::to_vec_pretty(value)?;
        let dir = root.join(key.dir());
        let path = dir.join(key.file_name());
        let tmp = dir.join(format!(".{}.tmp", key.file_name()));

        fs::write(&tmp, payload).await?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        debug!("wrote {}", path.display());
        Ok(())
    }
}

async fn load_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, TrackerError> {
    let mut records = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(record) => records.push(record),
                Err(err) => error!("failed to parse {}: {err}", path.display()),
            },
            Err(err) => error!("failed to read {}: {err}", path.display()),
        }
    }
    Ok(records)
}
