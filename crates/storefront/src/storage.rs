//! File-backed cart storage.
//!
//! Each client gets its own directory under the configured data directory,
//! and the cart key is stored as one JSON file inside it:
//!
//! ```text
//! <data_dir>/<client_id>/wearview-cart.json
//! ```
//!
//! Each write goes to its own temporary file in the client directory and is
//! renamed into place, so a crash mid-write leaves the previous cart intact
//! and overlapping writes never share a temporary file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use wearview_core::ClientId;
use wearview_core::cart::{CART_STORAGE_KEY, CartStorage, StorageError};

/// Cart storage for one client, backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for `client` under `data_dir`.
    ///
    /// Nothing is created until the first write.
    #[must_use]
    pub fn for_client(data_dir: &Path, client: ClientId) -> Self {
        Self {
            path: data_dir
                .join(client.to_string())
                .join(format!("{CART_STORAGE_KEY}.json")),
        }
    }

    /// Path of the cart file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the stored cart, as if the client's storage were purged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn purge(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, payload: &str) -> Result<(), StorageError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(payload.as_bytes())?;
        tmp.persist(&self.path).map_err(std::io::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use rust_decimal::Decimal;
    use wearview_core::ProductId;
    use wearview_core::cart::{CartStore, ProductDescriptor};

    use super::*;

    fn jeans() -> ProductDescriptor {
        ProductDescriptor {
            id: ProductId::new("2"),
            name: "Slim Fit Jeans".to_string(),
            price: Decimal::new(2499, 0),
            image: "/images/jeans.jpeg".to_string(),
            category: "Pants".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::for_client(dir.path(), ClientId::generate());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_cart_survives_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let client = ClientId::generate();

        let mut cart = CartStore::restore(FileStorage::for_client(dir.path(), client));
        cart.add_to_cart(jeans()).unwrap();
        cart.add_to_cart(jeans()).unwrap();

        let reloaded = CartStore::restore(FileStorage::for_client(dir.path(), client));
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total_price(), Decimal::new(4998, 0));
    }

    #[test]
    fn test_clients_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = CartStore::restore(FileStorage::for_client(dir.path(), ClientId::generate()));
        a.add_to_cart(jeans()).unwrap();

        let b = CartStore::restore(FileStorage::for_client(dir.path(), ClientId::generate()));
        assert!(b.is_empty());
    }

    #[test]
    fn test_corrupt_file_restores_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::for_client(dir.path(), ClientId::generate());
        storage.save("{{{").unwrap();

        assert!(CartStore::restore(storage).is_empty());
    }

    #[test]
    fn test_concurrent_writers_never_fail_or_tear() {
        let dir = tempfile::tempdir().unwrap();
        let client = ClientId::generate();

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let data_dir = dir.path().to_path_buf();
                thread::spawn(move || {
                    let payload = format!(r#"[{{"id":"{writer}","quantity":1}}]"#);
                    (0..200)
                        .filter(|_| {
                            FileStorage::for_client(&data_dir, client)
                                .save(&payload)
                                .is_err()
                        })
                        .count()
                })
            })
            .collect();

        let failures: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(failures, 0);

        let storage = FileStorage::for_client(dir.path(), client);
        let cart = CartStore::restore(storage.clone());
        assert_eq!(cart.items().len(), 1);

        let leftovers: Vec<_> = fs::read_dir(storage.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "{leftovers:?}");
    }

    #[test]
    fn test_purge_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::for_client(dir.path(), ClientId::generate());
        storage.save("[]").unwrap();
        assert!(storage.path().exists());

        storage.purge().unwrap();
        assert!(!storage.path().exists());
        storage.purge().unwrap();
    }
}
