//! Uploaded file handling.
//!
//! Every uploaded file is written once into the configured uploads directory
//! under a generated name and is referenced by that name from the database.
//! Files are never modified afterwards, only removed together with the rows
//! that reference them.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
};
use common::config::Storage;
use db::OffsetDateTime;
use rand::{thread_rng, Rng};
use tokio::fs;
use tracing::warn;

/// Max number of files accepted for a single multipart field.
pub(crate) const MAX_FILES_PER_FIELD: usize = 10;

/// Single file received from a multipart request.
pub(crate) struct UploadedFile {
    /// File name as provided by the browser.
    pub original_name: String,

    /// File contents.
    pub contents: Bytes,
}

/// Fully read multipart form.
#[derive(Default)]
pub(crate) struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl UploadForm {
    /// Read every field of the provided multipart request.
    ///
    /// File inputs that were left empty in the browser are skipped.
    pub async fn read(mut data: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = data.next_field().await? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };

            match field.file_name().map(String::from) {
                Some(original_name) => {
                    let contents = field.bytes().await?;

                    if original_name.is_empty() && contents.is_empty() {
                        continue;
                    }

                    form.files.entry(name).or_default().push(UploadedFile {
                        original_name,
                        contents,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Get a trimmed text field value, treating blank values as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Take every file uploaded under the provided field name.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

/// Uploads directory accessor.
pub(crate) struct FileStore<'a> {
    root: &'a Path,
}

impl<'a> FileStore<'a> {
    pub fn new(config: &'a Storage) -> Self {
        Self {
            root: &config.uploads_path,
        }
    }

    /// Path of a stored file.
    ///
    /// Only the final component of `name` is used, so stored names read
    /// from the database can never point outside of the uploads directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(base_name(name))
    }

    /// Store a single file, returning its stored name.
    pub async fn store(&self, file: &UploadedFile) -> io::Result<String> {
        fs::create_dir_all(self.root).await?;

        let name = stored_file_name(&file.original_name);
        fs::write(self.path(&name), &file.contents).await?;

        Ok(name)
    }

    /// Store every provided file, returning their stored names in order.
    ///
    /// If any of the files can not be written, files stored so far are removed.
    pub async fn store_all(&self, files: &[UploadedFile]) -> io::Result<Vec<String>> {
        let mut names = Vec::with_capacity(files.len());

        for file in files {
            match self.store(file).await {
                Ok(name) => names.push(name),
                Err(err) => {
                    self.remove_all(&names).await;
                    return Err(err);
                }
            }
        }

        Ok(names)
    }

    /// Remove stored files, logging and returning every failed removal.
    ///
    /// Files that are already missing are not considered to be failures.
    pub async fn remove_all<I>(&self, names: I) -> Vec<(String, io::Error)>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut failures = Vec::new();

        for name in names {
            let name = name.as_ref();

            match fs::remove_file(self.path(name)).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(file = name, %err, "unable to remove stored file");
                    failures.push((name.to_owned(), err));
                }
            }
        }

        failures
    }
}

/// Generate a unique-enough stored name for an uploaded file.
pub(crate) fn stored_file_name(original_name: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix: u32 = thread_rng().gen();

    format!("{millis}-{suffix}-{}", base_name(original_name))
}

/// Final path component of a browser-provided file name.
fn base_name(name: &str) -> &str {
    match name.rsplit(|c| c == '/' || c == '\\').next() {
        Some("") | Some(".") | Some("..") | None => "file",
        Some(name) => name,
    }
}
