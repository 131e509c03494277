//! JSONL storage for forum records
//!
//! Each entity kind lives in its own `.forum/{kind}s.jsonl` file with one
//! JSON object per line. New records are appended; saving a record whose
//! id is already stored rewrites the whole file. Readers still let the last
//! line win when an id repeats (hand edits, merges), and [`JsonlStore::compact`]
//! folds such duplicates away.
//! Uses file locking for concurrent access safety.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::repository::RepoResult;
use crate::domain::{
    Answer, AnswerId, AnswerRepository, Course, CourseId, CourseRepository, Topic, TopicId,
    TopicRepository, User, UserId, UserRepository,
};

/// A record type that can live in a JSONL store
pub trait Record: Serialize + DeserializeOwned + Clone {
    type Id: Copy + Ord + fmt::Display;

    /// Singular name, also used for the file name
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    /// Id handed out when the store is empty
    fn first_id() -> Self::Id;

    /// Id after `id`, or `None` once the id space is used up
    fn successor(id: Self::Id) -> Option<Self::Id>;
}

macro_rules! impl_record {
    ($ty:ty, $id:ty, $kind:literal) => {
        impl Record for $ty {
            type Id = $id;
            const KIND: &'static str = $kind;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn first_id() -> Self::Id {
                <$id>::new(1)
            }

            fn successor(id: Self::Id) -> Option<Self::Id> {
                id.next()
            }
        }
    };
}

impl_record!(Topic, TopicId, "topic");
impl_record!(Answer, AnswerId, "answer");
impl_record!(User, UserId, "user");
impl_record!(Course, CourseId, "course");

/// Store for one record type in JSONL format
pub struct JsonlStore<T> {
    path: PathBuf,
    _record: std::marker::PhantomData<T>,
}

impl<T: Record> JsonlStore<T> {
    /// Creates a new store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: std::marker::PhantomData,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(
            project_root
                .join(".forum")
                .join(format!("{}s.jsonl", T::KIND)),
        )
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records from the store
    pub fn read_all(&self) -> Result<BTreeMap<T::Id, T>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {} store", T::KIND))?;

        let reader = BufReader::new(&file);
        let mut records = BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line).with_context(|| {
                format!("Failed to parse {} at line {}", T::KIND, line_num + 1)
            })?;

            records.insert(record.id(), record);
        }

        // Lock is released when file is dropped
        Ok(records)
    }

    /// Reads a single record by id
    pub fn read(&self, id: T::Id) -> Result<Option<T>> {
        Ok(self.read_all()?.remove(&id))
    }

    /// Writes all records to the store (full rewrite)
    pub fn write_all(&self, records: &BTreeMap<T::Id, T>) -> Result<()> {
        self.ensure_parent()?;

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {} store", T::KIND))?;

            let mut writer = BufWriter::new(&file);

            // BTreeMap iteration keeps the output sorted by id
            for record in records.values() {
                let line = serde_json::to_string(record)
                    .with_context(|| format!("Failed to serialize {}", T::KIND))?;
                writeln!(writer, "{}", line)
                    .with_context(|| format!("Failed to write {}", T::KIND))?;
            }

            writer
                .flush()
                .with_context(|| format!("Failed to flush {} store", T::KIND))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record (used for inserts without a full rewrite)
    pub fn append(&self, record: &T) -> Result<()> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {} store", T::KIND))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize {}", T::KIND))?;
        writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", T::KIND))?;

        writer
            .flush()
            .with_context(|| format!("Failed to flush {} store", T::KIND))?;

        Ok(())
    }

    /// Inserts a new record by appending, or rewrites the file to replace one
    pub fn upsert(&self, record: &T) -> Result<()> {
        let mut records = self.read_all()?;
        if records.contains_key(&record.id()) {
            records.insert(record.id(), record.clone());
            self.write_all(&records)
        } else {
            self.append(record)
        }
    }

    /// Returns the id after the largest one stored
    pub fn next_id(&self) -> Result<T::Id> {
        match self.read_all()?.keys().next_back() {
            None => Ok(T::first_id()),
            Some(last) => T::successor(*last).ok_or_else(|| {
                anyhow::anyhow!("{} id space exhausted after {}", T::KIND, last)
            }),
        }
    }

    /// Compacts the store (removes duplicates, rewrites clean)
    pub fn compact(&self) -> Result<usize> {
        let records = self.read_all()?;
        let count = records.len();
        self.write_all(&records)?;
        Ok(count)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl TopicRepository for JsonlStore<Topic> {
    fn find_by_id(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        Ok(self.read(id)?)
    }

    fn save(&self, topic: &Topic) -> RepoResult<()> {
        Ok(self.upsert(topic)?)
    }

    fn next_id(&self) -> RepoResult<TopicId> {
        Ok(JsonlStore::next_id(self)?)
    }

    fn find_all(&self) -> RepoResult<Vec<Topic>> {
        Ok(self.read_all()?.into_values().collect())
    }
}

impl AnswerRepository for JsonlStore<Answer> {
    fn find_by_id(&self, id: AnswerId) -> RepoResult<Option<Answer>> {
        Ok(self.read(id)?)
    }

    fn save(&self, answer: &Answer) -> RepoResult<()> {
        Ok(self.upsert(answer)?)
    }

    fn next_id(&self) -> RepoResult<AnswerId> {
        Ok(JsonlStore::next_id(self)?)
    }

    fn find_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Answer>> {
        Ok(self
            .read_all()?
            .into_values()
            .filter(|answer| answer.topic_id == topic_id)
            .collect())
    }
}

impl UserRepository for JsonlStore<User> {
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.read(id)?)
    }

    fn save(&self, user: &User) -> RepoResult<()> {
        Ok(self.upsert(user)?)
    }

    fn next_id(&self) -> RepoResult<UserId> {
        Ok(JsonlStore::next_id(self)?)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.read_all()?.into_values().collect())
    }
}

impl CourseRepository for JsonlStore<Course> {
    fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>> {
        Ok(self.read(id)?)
    }

    fn save(&self, course: &Course) -> RepoResult<()> {
        Ok(self.upsert(course)?)
    }

    fn next_id(&self) -> RepoResult<CourseId> {
        Ok(JsonlStore::next_id(self)?)
    }

    fn find_all(&self) -> RepoResult<Vec<Course>> {
        Ok(self.read_all()?.into_values().collect())
    }
}
