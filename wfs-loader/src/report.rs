//! Rapport d'import avec graceful degradation
//!
//! Le rapport sert aussi de `DiagnosticSink` : chaque feature ignorée y est
//! comptée par raison, le détail part dans les logs.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use wfs_import::{Diagnostic, DiagnosticSink, Field, ImportOutcome, TracingSink};

/// Nombre maximal de messages conservés dans le rapport
const MAX_MESSAGES: usize = 100;

/// Statut global de l'import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportStatus {
    /// Toutes les features ont été importées
    Success,
    /// Import réussi avec des features ignorées
    PartialSuccess,
    /// Erreur fatale, rien n'a été importé
    Failed,
}

/// Rapport complet d'un import de couche
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Nom de la couche WFS
    pub layer: String,
    /// URL GetFeature ou fichier source
    pub source: String,
    pub crs: String,
    /// Type de géométrie de la couche créée
    pub layer_type: Option<String>,
    pub fields: Vec<Field>,
    pub duration_secs: f64,
    pub status: ImportStatus,

    pub imported: usize,
    pub skipped: usize,
    /// Features ignorées par raison
    pub skip_reasons: BTreeMap<String, usize>,
    /// Attributs absents remplacés par une valeur vide
    pub missing_attributes: usize,
    /// Premiers messages de diagnostic
    pub messages: Vec<String>,
    /// Raison de l'échec fatal
    pub fatal: Option<String>,
}

impl ImportReport {
    pub fn new(layer: &str, source: &str, crs: &str) -> Self {
        Self {
            layer: layer.to_string(),
            source: source.to_string(),
            crs: crs.to_string(),
            layer_type: None,
            fields: Vec::new(),
            duration_secs: 0.0,
            status: ImportStatus::Success,
            imported: 0,
            skipped: 0,
            skip_reasons: BTreeMap::new(),
            missing_attributes: 0,
            messages: Vec::new(),
            fatal: None,
        }
    }

    /// Enregistre un diagnostic du pipeline
    pub fn record_diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Skipped { reason, .. } => {
                *self.skip_reasons.entry(reason.code().to_string()).or_default() += 1;
            }
            Diagnostic::MissingAttribute { .. } => self.missing_attributes += 1,
        }
        if self.messages.len() < MAX_MESSAGES {
            self.messages.push(diagnostic.to_string());
        }
    }

    /// Enregistre le résultat d'un import réussi
    pub fn record_outcome(&mut self, outcome: &ImportOutcome) {
        self.imported = outcome.imported();
        self.skipped = outcome.skipped;
        self.layer_type = Some(outcome.family.layer_type().to_string());
        self.fields = outcome.layer_schema().fields;
    }

    /// Enregistre une erreur fatale (import ou téléchargement) : rien n'est importé
    pub fn record_fatal(&mut self, error: impl std::fmt::Display) {
        self.fatal = Some(error.to_string());
        self.imported = 0;
    }

    /// Définit la durée de l'import
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    ///
    /// Zéro feature importée n'est pas un échec : seul une erreur fatale l'est.
    pub fn finalize(&mut self) {
        self.status = if self.fatal.is_some() {
            ImportStatus::Failed
        } else if self.skipped > 0 {
            ImportStatus::PartialSuccess
        } else {
            ImportStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("IMPORT REPORT - Layer {}", self.layer);
        println!("{}", "=".repeat(60));

        println!("\nSource: {}", self.source);
        println!("Status: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        if let Some(ref fatal) = self.fatal {
            println!("\n--- FATAL ---");
            println!("  {}", fatal);
            println!("\n{}", "=".repeat(60));
            return;
        }

        println!("\n--- SUMMARY ---");
        println!(
            "Layer: {} ({})",
            self.layer_type.as_deref().unwrap_or("?"),
            self.crs
        );
        println!("Fields: {}", self.fields.len());
        println!("{}", self.summary());

        if !self.skip_reasons.is_empty() {
            println!("\n--- SKIPPED BY REASON ---");
            for (reason, count) in &self.skip_reasons {
                println!("  {}: {}", reason, count);
            }
        }

        if self.missing_attributes > 0 {
            println!("\nMissing attributes left empty: {}", self.missing_attributes);
        }

        if !self.messages.is_empty() {
            println!("\n--- DIAGNOSTICS ({}) ---", self.messages.len());
            for m in self.messages.iter().take(20) {
                println!("  {}", m);
            }
            if self.messages.len() > 20 {
                println!("  ... and {} more", self.messages.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Résumé affiché à l'utilisateur
    pub fn summary(&self) -> String {
        match self.fatal {
            Some(ref fatal) => format!("Layer '{}' not imported: {}", self.layer, fatal),
            None => format!(
                "{} layer features imported, {} skipped",
                self.imported, self.skipped
            ),
        }
    }
}

impl DiagnosticSink for ImportReport {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        TracingSink.diagnostic(diagnostic);
        self.record_diagnostic(diagnostic);
    }
}
