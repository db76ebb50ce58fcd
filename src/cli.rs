use clap::Parser;
use std::path::PathBuf;

use crate::config::{Dataset, ExtractConfig};

#[derive(Parser, Debug)]
#[command(name = "fanzip")]
#[command(version)]
#[command(about = "Extract a dataset's directory of ZIP archives in parallel", long_about = None)]
#[command(after_help = "Examples:\n  \
  fanzip --dataset CLOC --src-directory /mnt/raw --out-directory /mnt/cloc\n      \
  extracts every /mnt/raw/CLOC/data/*.zip into /mnt/cloc/<archive name>/")]
pub struct Cli {
    /// Dataset to extract: CGLM, CLOC or ImageNet2K
    #[arg(long, value_name = "NAME", default_value = "CGLM")]
    pub dataset: Dataset,

    /// Directory holding one <dataset>/data folder of ZIP archives per dataset
    #[arg(long, value_name = "DIR")]
    pub src_directory: PathBuf,

    /// Directory that receives one subdirectory per archive
    #[arg(long, value_name = "DIR")]
    pub out_directory: PathBuf,

    /// No progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> ExtractConfig {
        ExtractConfig::new(self.dataset, &self.src_directory, &self.out_directory)
    }
}
