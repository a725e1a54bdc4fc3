use crate::atomic::write_atomic;
use crate::error::{CacheError, Result};
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;

/// Délai maximal d'un téléchargement d'image
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Taille maximale d'une image téléchargée (16 Mio)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

/// Nombre maximal de redirections suivies
const MAX_REDIRECTS: usize = 10;

/// Client de téléchargement des images du cache
///
/// Le client HTTP est partagé par toutes les tâches d'un même remplissage
/// (pool de connexions commun). Cloner un `Fetcher` est peu coûteux.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl Fetcher {
    /// Crée un client qui suit les redirections et abandonne après `timeout`
    ///
    /// Les réponses de plus de `max_bytes` octets sont refusées.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Télécharge `url` entièrement en mémoire
    ///
    /// Le corps est lu par morceaux ; rien n'est écrit sur disque tant que la
    /// réponse n'est pas complète. Un `Content-Length` annoncé ou un corps
    /// reçu dépassant la limite interrompt le téléchargement.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || CacheError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        };

        let declared = response.content_length().unwrap_or(0);
        if declared > self.max_bytes as u64 {
            return Err(too_large());
        }

        let mut body = Vec::with_capacity(declared as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url, size = body.len(), "Downloaded preview image");
        Ok(body)
    }

    /// Télécharge `url` puis l'écrit atomiquement dans `path`
    ///
    /// L'écriture est faite sur un thread bloquant pour ne pas immobiliser le
    /// runtime. Retourne le nombre d'octets écrits.
    pub async fn fetch_to(&self, url: &str, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.fetch(url).await?;
        let size = bytes.len();
        let path = path.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes)).await??;
        Ok(size)
    }
}
