use crate::model::Agenda;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Magasin collaborateur d'un agenda. Deux écritures concurrentes sur le
/// même agenda peuvent surengager la capacité lue dans le même instantané :
/// le porteur du support doit sérialiser les mutations (verrou par fichier
/// ou revalidation de capacité juste avant l'écriture).
pub trait Storage {
    /// Charge un agenda depuis un support.
    fn load(&self) -> anyhow::Result<Agenda>;
    /// Sauvegarde de manière atomique.
    fn save(&self, agenda: &Agenda) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Charge l'agenda, ou un agenda vide si le fichier n'existe pas
    /// encore. Un fichier présent mais illisible reste une erreur : un
    /// agenda corrompu ne doit jamais être écrasé en silence par un vide.
    pub fn load_or_empty(&self) -> anyhow::Result<Agenda> {
        if !self.path.exists() {
            return Ok(Agenda::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Agenda> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let agenda: Agenda = serde_json::from_slice(&data)
            .with_context(|| format!("parsing agenda {}", self.path.display()))?;
        Ok(agenda)
    }

    fn save(&self, agenda: &Agenda) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(agenda)?;
        let mut tmp =
            NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
                .with_context(|| format!("creating temp file near {}", self.path.display()))?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("atomic rename onto {}", self.path.display()))?;
        Ok(())
    }
}
