use crate::commands::{analyze, export, fetch, publish};
use crate::error::Error;
use crate::services::CollectorConfig;
use crate::utils::get_data_dir;

/// Full pipeline: fetch → analyze → export → publish. The entry the
/// external weekly scheduler invokes; exit code is nonzero when no
/// usable data came out of the run.
pub fn run(start_date: String, skip_fetch: bool) {
    match pipeline(start_date, skip_fetch) {
        Ok(()) => {
            println!("\n✅ Pipeline completed");
        }
        Err(e) => {
            eprintln!("\n❌ Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn pipeline(start_date: String, skip_fetch: bool) -> Result<(), Error> {
    if skip_fetch {
        println!("⏭️  Skipping collection, reusing {}", get_data_dir().display());
    } else {
        let config = CollectorConfig {
            start_date,
            ..CollectorConfig::default()
        };
        fetch::collect(config)?;
    }

    let (manifest, data) = analyze::load_inputs()?;
    let records = crate::services::analytics::build_records(&manifest, &data)?;
    let sectors = crate::services::analytics::sector_averages(&records);
    println!("📊 Metrics computed for {} securities", records.len());

    export::render(export::ExportFormat::All, &records, &sectors, &data)?;

    publish::do_publish()
}
