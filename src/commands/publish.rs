use crate::error::Error;
use crate::services::publisher::{self, PublishOutcome};
use crate::utils::{get_dashboard_dir, get_site_dir};

pub fn run() {
    match do_publish() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Publish failed: {}", e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn do_publish() -> Result<(), Error> {
    match publisher::publish(&get_dashboard_dir(), &get_site_dir())? {
        PublishOutcome::Unchanged => {
            println!("💤 Dashboard unchanged, nothing published");
        }
        PublishOutcome::Published { committed } => {
            if committed {
                println!("🚀 Site updated and committed");
            } else {
                println!("📄 Site updated (nothing for git to commit)");
            }
        }
    }
    Ok(())
}
