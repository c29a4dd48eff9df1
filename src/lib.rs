/*!
# AS3 Docset Converter

Converts the unpacked ActionScript 3.0 Reference for the Adobe Flash Platform
into an offline docset bundle: an indexed archive with a manifest, a table
of contents, a token index and cleaned-up copies of every reference page.

## Architecture

```text
as3-docset
├── Core              - Error types, file system helpers
├── Configuration     - Immutable converter configuration (TOML)
├── Docs Integration  - Predicates, table extractors, classifiers,
│                       page index harvester, page rewriter
├── Docset            - Bundle assembly: Info.plist, Nodes.xml, Tokens.xml,
│                       static assets, external indexer
└── CLI Common        - Logging, coloured output, progress
```

## Usage

### CLI
```bash
# Build <source>/as3.docset
as3-docset build --source ./langref

# List pages discovered through the alphabetic indexes
as3-docset pages --source ./langref

# Tokens extracted from one page
as3-docset inspect --source ./langref flash/display/Sprite.html --format json
```

### Library
```rust,ignore
use as3_docset::{ConverterConfig, DocsetBuilder};

let builder = DocsetBuilder::new(ConverterConfig::default(), "./langref", None)?;
let summary = builder.build()?;
println!("{} tokens", summary.total_tokens);
```
*/

pub mod cli_common;
pub mod configuration;
pub mod core;
pub mod docs_integration;
pub mod docset;

pub use crate::configuration::ConverterConfig;
pub use crate::core::{is_validation_error, ExtractionError, ValidationError};
pub use crate::docs_integration::{PageExtractor, PageIndex, PageRewriter, SymbolToken};
pub use crate::docset::{BuildObserver, BuildSummary, DocsetBuilder, IndexingOutcome};
