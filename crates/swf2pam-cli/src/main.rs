use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use serde::Deserialize;
use swf2pam_core::export::{export_images, image_output_dir};
use swf2pam_core::{ActionTable, ConvertConfig, Document, PamError, ResourceFormat, convert};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "swf2pam",
    about = "Convert a parsed SWF document into a PopAnim (PAM) animation",
    version,
    author
)]
struct Cli {
    /// Parsed SWF document (JSON); the .pam is written next to it
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Directory for atlas pages and resource metadata
    #[arg(short, long, default_value = "output", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Actions file (default: <input dir>/<name>_actions.json)
    #[arg(long, help_heading = "Input/Output")]
    actions: Option<PathBuf>,
    /// YAML config file path (overrides the flags below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    /// Resample bitmaps for art scaling
    #[arg(long, default_value_t = false, help_heading = "Images")]
    scale_images: bool,
    /// Art scale factor used with --scale-images
    #[arg(long, default_value_t = swf2pam_core::DEFAULT_IMAGE_SCALE, help_heading = "Images")]
    image_scale_factor: f32,
    /// Also write every decoded bitmap as its own PNG
    #[arg(long, default_value_t = false, help_heading = "Images")]
    export_images: bool,

    /// Base path of image resources, e.g. `zombies/basic` (required unless set in --config)
    #[arg(long, help_heading = "Resources")]
    res_base_path: Option<String>,
    /// Resource group name
    #[arg(long, default_value = "Group", help_heading = "Resources")]
    res_group_name: String,
    /// Resource metadata layout: sen|spc
    #[arg(long, default_value = "sen", value_parser = ["sen", "spc"], help_heading = "Resources")]
    resource_format: String,
    /// Atlas page edge in pixels
    #[arg(long, default_value_t = swf2pam_core::DEFAULT_PAGE_SIZE, help_heading = "Resources")]
    page_size: u32,

    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,

    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = e
                .chain()
                .find_map(|c| c.downcast_ref::<PamError>())
                .map_or(1, PamError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut cfg = ConvertConfig {
        scale_images: cli.scale_images,
        image_scale_factor: cli.image_scale_factor,
        export_images: cli.export_images,
        res_base_path: cli.res_base_path.clone().unwrap_or_default(),
        res_group_name: cli.res_group_name.clone(),
        resource_format: cli
            .resource_format
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown resource format: {}", cli.resource_format))?,
        page_size: cli.page_size,
    };
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_convert_config(cfg);
    }
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let doc_name = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .context("input path has no file name")?
        .to_string();
    let input_dir = cli.input.parent().unwrap_or(Path::new("")).to_path_buf();

    let doc = Document::load(&cli.input)
        .with_context(|| format!("load document {}", cli.input.display()))?;
    let actions_path = cli
        .actions
        .clone()
        .unwrap_or_else(|| input_dir.join(format!("{doc_name}_actions.json")));
    let actions = ActionTable::load(&actions_path)
        .with_context(|| format!("load actions {}", actions_path.display()))?;

    let out = convert(&doc, &doc_name, &cfg, actions.as_ref())?;

    let pam_path = input_dir.join(format!("{doc_name}.pam"));
    fs::write(&pam_path, &out.pam).with_context(|| format!("write {}", pam_path.display()))?;
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    let written = out
        .write_resources(&cli.out_dir)
        .with_context(|| format!("write resources under {}", cli.out_dir.display()))?;
    for path in &written {
        info!(path = %path.display(), "wrote");
    }

    if cfg.export_images {
        let dir = image_output_dir(&input_dir, &doc_name);
        export_with_progress(&out.exports, &dir, cli.progress && !cli.quiet)?;
    }

    info!("{}", out.stats.summary());
    info!(
        path = %pam_path.display(),
        bytes = out.pam.len(),
        format = cfg.resource_format.dir_name(),
        "finished"
    );
    Ok(())
}

fn export_with_progress(
    images: &[swf2pam_core::fills::ExportImage],
    dir: &Path,
    progress: bool,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(images.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} exporting {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let paths = export_images(images, dir, |p| {
        if let Some(b) = &bar {
            let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
            b.inc(1);
        }
    })
    .with_context(|| format!("export images to {}", dir.display()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(count = paths.len(), dir = %dir.display(), "exported images");
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize)]
struct YamlConfig {
    scale_images: Option<bool>,
    image_scale_factor: Option<f32>,
    export_images: Option<bool>,
    res_base_path: Option<String>,
    res_group_name: Option<String>,
    resource_format: Option<ResourceFormat>,
    page_size: Option<u32>,
}

impl YamlConfig {
    fn into_convert_config(self, mut cfg: ConvertConfig) -> ConvertConfig {
        if let Some(v) = self.scale_images {
            cfg.scale_images = v;
        }
        if let Some(v) = self.image_scale_factor {
            cfg.image_scale_factor = v;
        }
        if let Some(v) = self.export_images {
            cfg.export_images = v;
        }
        if let Some(v) = self.res_base_path {
            cfg.res_base_path = v;
        }
        if let Some(v) = self.res_group_name {
            cfg.res_group_name = v;
        }
        if let Some(v) = self.resource_format {
            cfg.resource_format = v;
        }
        if let Some(v) = self.page_size {
            cfg.page_size = v;
        }
        cfg
    }
}
