use shapeql::{Catalog, Compiled};
use std::path::Path;

/// Load a catalog and compile its root shape.
pub fn compile_catalog(path: &Path) -> anyhow::Result<Compiled> {
    let catalog = Catalog::load(path)?;
    tracing::debug!(
        path = %path.display(),
        root = catalog.root_name(),
        "compiling catalog"
    );
    let compiled = shapeql::compile_ref(Some(&catalog.root()))?;
    Ok(compiled)
}
