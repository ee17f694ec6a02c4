//! Top-level compile entry point.

use std::path::Path;
use std::sync::Arc;

use crate::meta::StyleMeta;
use crate::processor::{
    FileProcessor, FileSystem, FunctionRegistry, ModuleResolver, ProcessError,
};
use crate::transformer::{StyleTransformer, TransformOutput};

/// Owns the shared [`FileProcessor`] and drives process-then-transform for
/// entry files. Cheap to call repeatedly; unchanged dependencies stay
/// cached.
pub struct StyleCompiler {
    processor: FileProcessor,
}

impl StyleCompiler {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { processor: FileProcessor::new(fs) }
    }

    pub fn with_resolver(fs: Arc<dyn FileSystem>, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self { processor: FileProcessor::with_resolver(fs, resolver) }
    }

    pub fn processor(&self) -> &FileProcessor {
        &self.processor
    }

    /// The function-mixin registry shared by every compile.
    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        self.processor.functions()
    }

    /// Process a stylesheet without transforming it.
    pub fn process(&self, path: &Path) -> Result<Arc<StyleMeta>, ProcessError> {
        self.processor.process_file(path)
    }

    /// Compile one entry stylesheet to output CSS and exports.
    pub fn compile(&self, path: &Path) -> Result<TransformOutput, ProcessError> {
        let meta = self.processor.process_file(path)?;
        Ok(StyleTransformer::new(&self.processor).transform(&meta))
    }
}
