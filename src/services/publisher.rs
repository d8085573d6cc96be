use chrono::Local;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Outcome of a publish run
#[derive(Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Dashboard identical to the published copy; nothing to do
    Unchanged,
    /// Site updated and handed to git
    Published { committed: bool },
}

/// Copy the freshest dashboard into the published-site directory and
/// hand the change to git.
///
/// Writes `index.html`, a dated snapshot and the site README, then runs
/// `git add`/`git commit` on the site directory. An unchanged dashboard
/// is a no-op, not an error. "Nothing to commit" from git is treated
/// the same way.
pub fn publish(dashboard_dir: &Path, site_dir: &Path) -> Result<PublishOutcome> {
    let source = dashboard_dir.join("index.html");
    let html = fs::read_to_string(&source).map_err(|e| {
        Error::NotFound(format!(
            "dashboard {} not readable ({}), run the exporter first",
            source.display(),
            e
        ))
    })?;

    let target = site_dir.join("index.html");
    if let Ok(existing) = fs::read_to_string(&target) {
        if existing == html {
            tracing::info!("Dashboard unchanged, skipping publish");
            return Ok(PublishOutcome::Unchanged);
        }
    }

    fs::create_dir_all(site_dir)?;
    fs::write(&target, &html)?;

    let today = Local::now();
    let dated = site_dir.join(format!("classement_brvm_{}.html", today.format("%Y%m%d")));
    fs::write(&dated, &html)?;

    fs::write(site_dir.join("README.md"), site_readme(&today.format("%d/%m/%Y").to_string()))?;

    let committed = commit_site(site_dir, &today.format("%Y-%m-%d").to_string())?;

    Ok(PublishOutcome::Published { committed })
}

/// `git add` + `git commit` on the site directory. Returns false when
/// git reports nothing to commit.
fn commit_site(site_dir: &Path, date: &str) -> Result<bool> {
    let add = Command::new("git")
        .arg("add")
        .arg(site_dir)
        .output()
        .map_err(|e| Error::Publish(format!("failed to run git add: {}", e)))?;

    if !add.status.success() {
        return Err(Error::Publish(format!(
            "git add failed: {}",
            String::from_utf8_lossy(&add.stderr).trim()
        )));
    }

    let commit = Command::new("git")
        .args(["commit", "-m"])
        .arg(format!("Mise à jour du tableau de bord BRVM ({})", date))
        .output()
        .map_err(|e| Error::Publish(format!("failed to run git commit: {}", e)))?;

    if commit.status.success() {
        return Ok(true);
    }

    let stdout = String::from_utf8_lossy(&commit.stdout);
    let stderr = String::from_utf8_lossy(&commit.stderr);
    if stdout.contains("nothing to commit") || stderr.contains("nothing to commit") {
        tracing::info!("Nothing to commit for the published site");
        return Ok(false);
    }

    Err(Error::Publish(format!(
        "git commit failed: {}",
        if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() }
    )))
}

fn site_readme(date: &str) -> String {
    format!(
        "# Tableau de bord des valeurs de la BRVM\n\n\
         Ce dossier contient le tableau de bord HTML des valeurs mobilières cotées à la\n\
         Bourse Régionale des Valeurs Mobilières (BRVM).\n\n\
         - **index.html** : tableau de bord actuel, mis à jour le {}\n\
         - Des copies datées sont conservées pour garder un historique des analyses\n\n\
         Ce tableau de bord est généré automatiquement par `brvm-analysis run`.\n",
        date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_publish_requires_dashboard() {
        let dashboard = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();

        let result = publish(dashboard.path(), site.path());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_publish_unchanged_is_noop() {
        let dashboard = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();

        fs::write(dashboard.path().join("index.html"), "<html>v1</html>").unwrap();
        fs::write(site.path().join("index.html"), "<html>v1</html>").unwrap();

        let outcome = publish(dashboard.path(), site.path()).unwrap();
        assert_eq!(outcome, PublishOutcome::Unchanged);
    }
}
