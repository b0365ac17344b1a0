pub mod interactive_map;
pub mod static_map;

use std::path::{Path, PathBuf};
use log::{info, error};

use crate::errors::Result;


/// One output-producing pipeline: gather the literal dataset, build the map or
/// chart from it, then write the files into a directory. Outputs are always
/// regenerated and existing files overwritten.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;

    /// File names `load` writes, relative to the output directory.
    fn output_file_names(&self) -> Vec<&'static str>;

    fn extract(&mut self) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    fn output_paths(&self, dir: &Path) -> Vec<PathBuf> {
        self.output_file_names()
            .into_iter()
            .map(|name| dir.join(name))
            .collect()
    }

    fn process(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        info!(etl_name = self.etl_name(); "Starting ETL process");

        info!(etl_name = self.etl_name(); "Extracting");
        let input = match self.extract() {
            Ok(input) => Ok(input),
            Err(err) => {
                error!(etl_name = self.etl_name(), err = err.message; "Extraction failed with error");
                Err(err)
            },
        }?;

        info!(etl_name = self.etl_name(); "Transforming");
        let output = match self.transform(input) {
            Ok(output) => Ok(output),
            Err(err) => {
                error!(etl_name = self.etl_name(), err = err.message; "Transformation failed with error");
                Err(err)
            },
        }?;

        info!(etl_name = self.etl_name(); "Loading");
        match self.load(dir, output) {
            Ok(_) => Ok(()),
            Err(err) => {
                error!(etl_name = self.etl_name(), err = err.message; "Loading failed with error");
                Err(err)
            },
        }?;

        let paths = self.output_paths(dir);
        info!(etl_name = self.etl_name(), files = paths.len(); "Process finished");
        Ok(paths)
    }
}
