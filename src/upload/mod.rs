pub mod handle;

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rand::Rng;

use crate::{certificate::file, config};

pub use certportal_shared::upload::*;

use certportal_shared::upload::handle::UploadDescriptor;

/// The static instance of uploads.
pub static INSTANCE: Lazy<UploadManager> = Lazy::new(UploadManager::new);

/// Builds an upload from its descriptor.
///
/// Blank titles are dropped and the file goes through the same checks
/// as a certificate file, under the upload size limit.
pub fn build(owner: u64, descriptor: UploadDescriptor) -> Result<UploadItem, crate::Error> {
    let max_size = config::INSTANCE.max_upload_size;
    let file = file::load(descriptor.file, max_size)?;
    file.validate(max_size)?;

    Ok(UploadItem {
        id: INSTANCE.free_id(),
        owner,
        title: descriptor
            .title
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty()),
        category: descriptor.category,
        semester_term: descriptor.semester_term,
        issued_on: descriptor.issued_on,
        file,
        created_at: Utc::now(),
    })
}

/// Save an upload in the background.
pub fn save_upload(_upload: &UploadItem) {
    #[cfg(not(test))]
    {
        let id = _upload.id;
        let data = match toml::to_string(_upload) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!("failed to serialize upload {id}: {err}");
                return;
            }
        };

        tokio::spawn(async move {
            if let Err(err) = tokio::fs::write(format!("./data/uploads/{id}.toml"), data).await {
                tracing::error!("failed to save upload {id}: {err}");
            }
        });
    }
}

/// Remove an upload from filesystem in the background.
pub fn remove_upload(_id: u64) {
    #[cfg(not(test))]
    {
        let id = _id;
        tokio::spawn(async move {
            if let Err(err) = tokio::fs::remove_file(format!("./data/uploads/{id}.toml")).await {
                tracing::error!("failed to remove upload {id}: {err}");
            }
        });
    }
}

/// Uploads grouped by their owners.
pub struct UploadManager {
    uploads: DashMap<u64, Vec<UploadItem>>,
}

impl UploadManager {
    fn new() -> Self {
        let uploads = DashMap::new();

        #[cfg(not(test))]
        for upload in load_uploads() {
            uploads
                .entry(upload.owner)
                .or_insert_with(Vec::new)
                .push(upload);
        }

        Self { uploads }
    }

    /// Count of every upload.
    pub fn len(&self) -> usize {
        self.uploads.iter().map(|e| e.value().len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, owner: u64) -> usize {
        self.uploads.get(&owner).map_or(0, |e| e.len())
    }

    fn contains_id(&self, id: u64) -> bool {
        self.uploads
            .iter()
            .any(|e| e.value().iter().any(|u| u.id == id))
    }

    fn free_id(&self) -> u64 {
        let mut rng = rand::thread_rng();
        loop {
            let id = rng.gen_range(1..(1 << 53));
            if !self.contains_id(id) {
                return id;
            }
        }
    }

    /// Saves and adds an upload.
    pub fn insert(&self, upload: UploadItem) {
        let mut uploads = self.uploads.entry(upload.owner).or_insert_with(Vec::new);
        save_upload(&upload);
        uploads.push(upload);
    }

    /// Runs `f` on the target upload.
    pub fn get<R>(&self, owner: u64, id: u64, f: impl FnOnce(&UploadItem) -> R) -> Option<R> {
        let uploads = self.uploads.get(&owner)?;
        uploads.iter().find(|u| u.id == id).map(f)
    }

    /// Removes the target upload.
    pub fn remove(&self, owner: u64, id: u64) -> Option<UploadItem> {
        let mut uploads = self.uploads.get_mut(&owner)?;
        let index = uploads.iter().position(|u| u.id == id)?;
        let upload = uploads.remove(index);
        remove_upload(id);
        Some(upload)
    }

    /// Removes every upload of the account, returning how many there were.
    pub fn remove_owner(&self, owner: u64) -> usize {
        match self.uploads.remove(&owner) {
            Some((_, uploads)) => {
                for upload in &uploads {
                    remove_upload(upload.id);
                }
                uploads.len()
            }
            None => 0,
        }
    }

    /// Describes uploads of the account, newest first.
    pub fn infos(&self, owner: u64) -> Vec<UploadInfo> {
        let mut infos: Vec<UploadInfo> = self
            .uploads
            .get(&owner)
            .map(|e| e.iter().map(UploadItem::info).collect())
            .unwrap_or_default();
        infos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        infos
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.uploads.clear()
    }
}

#[cfg(not(test))]
fn load_uploads() -> Vec<UploadItem> {
    const DIR: &str = "./data/uploads";

    let dir = match std::fs::read_dir(DIR) {
        Ok(dir) => dir,
        Err(err) => {
            tracing::warn!("failed to read {DIR}: {err}");
            if let Err(err) = std::fs::create_dir_all(DIR) {
                tracing::error!("failed to create {DIR}: {err}");
            }
            return Vec::new();
        }
    };

    dir.filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            match std::fs::read_to_string(&path)
                .map_err(|err| err.to_string())
                .and_then(|s| toml::from_str::<UploadItem>(&s).map_err(|err| err.to_string()))
            {
                Ok(upload) => Some(upload),
                Err(err) => {
                    tracing::error!("failed to load upload from {}: {err}", path.display());
                    None
                }
            }
        })
        .collect()
}
