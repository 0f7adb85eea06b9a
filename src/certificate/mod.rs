pub mod file;
pub mod handle;

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rand::Rng;

use crate::config;

pub use certportal_shared::certificate::*;

use certportal_shared::certificate::handle::CertificateDescriptor;

/// The static instance of certificates.
pub static INSTANCE: Lazy<CertificateManager> = Lazy::new(CertificateManager::new);

/// Builds a certificate from its descriptor, checking every invariant.
pub fn build(owner: u64, descriptor: CertificateDescriptor) -> Result<Certificate, crate::Error> {
    let mut meta = descriptor.meta;
    meta.normalize();
    meta.validate()?;

    let max_size = config::INSTANCE.max_file_size;
    let file = file::load(descriptor.file, max_size)?;
    file.validate(max_size)?;

    let now = Utc::now();
    Ok(Certificate {
        id: INSTANCE.free_id(),
        owner,
        meta,
        file,
        created_at: now,
        updated_at: now,
    })
}

/// Save a certificate in the background.
pub fn save_certificate(_certificate: &Certificate) {
    #[cfg(not(test))]
    {
        let id = _certificate.id;
        let data = match toml::to_string(_certificate) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!("failed to serialize certificate {id}: {err}");
                return;
            }
        };

        tokio::spawn(async move {
            if let Err(err) = tokio::fs::write(format!("./data/certificates/{id}.toml"), data).await
            {
                tracing::error!("failed to save certificate {id}: {err}");
            }
        });
    }
}

/// Remove a certificate from filesystem in the background.
pub fn remove_certificate(_id: u64) {
    #[cfg(not(test))]
    {
        let id = _id;
        tokio::spawn(async move {
            if let Err(err) = tokio::fs::remove_file(format!("./data/certificates/{id}.toml")).await
            {
                tracing::error!("failed to remove certificate {id}: {err}");
            }
        });
    }
}

/// Certificates grouped by their owners.
pub struct CertificateManager {
    certificates: DashMap<u64, Vec<Certificate>>,
}

impl CertificateManager {
    fn new() -> Self {
        let certificates = DashMap::new();

        #[cfg(not(test))]
        for certificate in load_certificates() {
            certificates
                .entry(certificate.owner)
                .or_insert_with(Vec::new)
                .push(certificate);
        }

        Self { certificates }
    }

    /// Count of every certificate.
    pub fn len(&self) -> usize {
        self.certificates.iter().map(|e| e.value().len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of certificates owned by the account.
    pub fn count(&self, owner: u64) -> usize {
        self.certificates.get(&owner).map_or(0, |e| e.len())
    }

    /// Indicates if the target id is already contained in this instance.
    pub fn contains_id(&self, id: u64) -> bool {
        self.certificates
            .iter()
            .any(|e| e.value().iter().any(|c| c.id == id))
    }

    /// Picks a random id not taken by any certificate.
    fn free_id(&self) -> u64 {
        let mut rng = rand::thread_rng();
        loop {
            // Ids stay below 2^53 so they survive TOML and JSON numbers.
            let id = rng.gen_range(1..(1 << 53));
            if !self.contains_id(id) {
                return id;
            }
        }
    }

    /// Saves and adds a certificate.
    pub fn insert(&self, certificate: Certificate) {
        save_certificate(&certificate);
        self.certificates
            .entry(certificate.owner)
            .or_insert_with(Vec::new)
            .push(certificate);
    }

    /// Runs `f` on the target certificate.
    pub fn get<R>(&self, owner: u64, id: u64, f: impl FnOnce(&Certificate) -> R) -> Option<R> {
        let certificates = self.certificates.get(&owner)?;
        certificates.iter().find(|c| c.id == id).map(f)
    }

    /// Runs `f` on the target certificate mutably.
    pub fn get_mut<R>(
        &self,
        owner: u64,
        id: u64,
        f: impl FnOnce(&mut Certificate) -> R,
    ) -> Option<R> {
        let mut certificates = self.certificates.get_mut(&owner)?;
        certificates.iter_mut().find(|c| c.id == id).map(f)
    }

    /// Removes the target certificate.
    pub fn remove(&self, owner: u64, id: u64) -> Option<Certificate> {
        let mut certificates = self.certificates.get_mut(&owner)?;
        let index = certificates.iter().position(|c| c.id == id)?;
        let certificate = certificates.remove(index);
        remove_certificate(id);
        Some(certificate)
    }

    /// Removes every certificate of the account, returning how many there were.
    pub fn remove_owner(&self, owner: u64) -> usize {
        match self.certificates.remove(&owner) {
            Some((_, certificates)) => {
                for certificate in &certificates {
                    remove_certificate(certificate.id);
                }
                certificates.len()
            }
            None => 0,
        }
    }

    /// Describes certificates of the account, or of everyone when `owner`
    /// is `None`, newest first.
    pub fn infos(&self, owner: Option<u64>) -> Vec<CertificateInfo> {
        let mut infos: Vec<CertificateInfo> = match owner {
            Some(owner) => self
                .certificates
                .get(&owner)
                .map(|e| e.iter().map(Certificate::info).collect())
                .unwrap_or_default(),
            None => self
                .certificates
                .iter()
                .flat_map(|e| e.value().iter().map(Certificate::info).collect::<Vec<_>>())
                .collect(),
        };
        infos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        infos
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.certificates.clear()
    }
}

#[cfg(not(test))]
fn load_certificates() -> Vec<Certificate> {
    const DIR: &str = "./data/certificates";

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
                .and_then(|s| toml::from_str::<Certificate>(&s).map_err(|err| err.to_string()))
            {
                Ok(certificate) => Some(certificate),
                Err(err) => {
                    tracing::error!("failed to load certificate from {}: {err}", path.display());
                    None
                }
            }
        })
        .collect()
}
