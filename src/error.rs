use std::path::PathBuf;

use thiserror::Error;

const ENCODING_HINT: &str =
    "Essaie de changer l'encodage : \"encoding\": \"latin-1\" dans la section \"source\" de rna_etl.json";

/// Failures the binaries report with a dedicated French diagnostic.
///
/// Everything else travels as a plain `anyhow::Error` with context.
#[derive(Debug, Clone, Error)]
pub enum RnaError {
    #[error("{} introuvable !", .0.display())]
    MissingInput(PathBuf),

    #[error("colonne '{0}' absente du fichier")]
    MissingColumn(String),

    #[error("aucune association trouvée pour le code postal {0}")]
    NoMatch(String),

    #[error("ligne {row} : texte illisible en {encoding}")]
    Decode { row: usize, encoding: &'static str },

    /// The preview could not read its CSV for a reason other than decoding.
    #[error("{} illisible : {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("aucune police utilisable pour les graphiques ({0})")]
    Font(String),
}

impl RnaError {
    /// Remediation hint printed under the diagnostic, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RnaError::Decode { .. } | RnaError::Unreadable { .. } => Some(ENCODING_HINT),
            RnaError::MissingInput(_) => {
                Some("Télécharge le fichier depuis data.gouv.fr et place-le dans ce dossier")
            }
            RnaError::Font(_) => Some("Indique une police TrueType avec la variable RNA_FONT"),
            _ => None,
        }
    }
}
