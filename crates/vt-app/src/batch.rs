use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;
use vt_core::config::BatchConfig;
use vt_core::row::{DatasetRow, FileId};
use vt_core::segment::VowelSegmenter;
use vt_core::traits::{AcousticFrontEnd, GridReader};
use vt_export::summary::{BatchSummary, FailedFile};
use vt_export::table::write_table;
use vt_grid::pairing::{FilePair, pair_files};

/// Grid, track and rows for one audio/alignment pair.
///
/// # Errors
/// Returns an error if the alignment or the audio cannot be loaded.
pub fn process_file<F, R>(
    pair: &FilePair,
    config: &BatchConfig,
    segmenter: &VowelSegmenter,
    front_end: &F,
    reader: &R,
) -> Result<Vec<DatasetRow>>
where
    F: AcousticFrontEnd,
    R: GridReader,
{
    let grid = reader.load(&pair.alignment)?;
    let track = front_end
        .analyze(&pair.audio, &config.formant)
        .with_context(|| format!("Acoustic analysis failed: {}", pair.audio.display()))?;
    let file = FileId::from_stem(
        &pair.file_id,
        config.participant_id_len,
        &config.task_delimiter,
    );
    Ok(segmenter.segment(&grid, &track, &file))
}

/// Point d'entrée du traitement par lots.
///
/// Pairs the audio and alignment directories, processes every pair
/// (in parallel unless `jobs == 1`), writes the table once and returns the
/// run summary. A file that fails is logged and listed in the summary; the
/// rest of the batch still runs.
///
/// # Errors
/// Returns an error on invalid configuration, an unreadable audio directory
/// or an unwritable output file.
pub fn run_batch<F, R>(config: &BatchConfig, front_end: &F, reader: &R) -> Result<BatchSummary>
where
    F: AcousticFrontEnd,
    R: GridReader,
{
    config.validate()?;

    let report = pair_files(
        &config.audio_dir,
        &config.alignment_dir,
        &config.audio_extension,
        &config.alignment_extension,
    )?;
    let segmenter = VowelSegmenter::from_config(config);
    let total = report.pairs.len();
    let done = AtomicUsize::new(0);

    let work = |pair: &FilePair| {
        let result = process_file(pair, config, &segmenter, front_end, reader);
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("Processed {n}/{total}: {}", pair.file_id);
        result
    };

    // Indexed collect keeps enumeration order whatever the scheduling.
    let results: Vec<Result<Vec<DatasetRow>>> = match config.jobs {
        1 => report.pairs.iter().map(work).collect(),
        0 => report.pairs.par_iter().map(work).collect(),
        n => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("Cannot build worker pool")?
            .install(|| report.pairs.par_iter().map(work).collect()),
    };

    let mut rows = Vec::new();
    let mut summary = BatchSummary {
        paired: total,
        skipped_unpaired: report.skipped,
        output: config.output_path(),
        ..BatchSummary::default()
    };
    for (pair, result) in report.pairs.iter().zip(results) {
        match result {
            Ok(file_rows) => {
                summary.processed += 1;
                rows.extend(file_rows);
            }
            Err(e) => {
                log::error!("{}: {e:#}", pair.file_id);
                summary.failed.push(FailedFile {
                    file_id: pair.file_id.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    write_table(&summary.output, &rows)?;
    summary.rows = rows.len();

    log::info!(
        "Done: {} rows from {}/{} files ({} failed, {} without alignment)",
        summary.rows,
        summary.processed,
        summary.paired,
        summary.failed.len(),
        summary.skipped_unpaired.len()
    );
    Ok(summary)
}
