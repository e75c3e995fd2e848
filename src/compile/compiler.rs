//! Compiler - Core compilation pipeline
//!
//! Orchestrates discovery, configuration merging, ref() resolution, statement
//! emission and artifact writing. Compilation itself is pure; all filesystem
//! output happens in [`Compiler::write`].

use crate::compile::error::CompileError;
use crate::compile::graph::DependencyGraph;
use crate::compile::manifest::Manifest;
use crate::compile::model::{find_model, fqn_parts, Materialization, Model};
use crate::compile::refs::render_refs;
use crate::compile::source::{discover_sources, ModelSource};
use crate::compile::{ANALYSIS_DIR, GRAPH_FILE, MANIFEST_FILE};
use crate::config::project::PROJECT_FILE;
use crate::config::{ProjectConfig, TargetProfile};
use crate::error::GantryError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Core compilation engine
///
/// The `Compiler` ties a project directory to its parsed configuration and
/// target profile, and turns the project's model sources into executable
/// statement artifacts.
pub struct Compiler {
    project_dir: PathBuf,
    pub project: ProjectConfig,
    pub target: TargetProfile,
}

/// One compiled model with the statements that materialize it
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub name: String,
    pub package: String,
    /// Dotted fully qualified name
    pub fqn: String,
    pub materialized: Materialization,
    pub temporary: bool,
    pub checksum: String,
    /// Artifact path relative to the target directory
    pub build_path: PathBuf,
    /// Ordered statements; executing them in order materializes the model
    pub statements: Vec<String>,
    pub depends_on: Vec<String>,
}

/// A compiled analysis: rendered SQL that is never wrapped in DDL
#[derive(Debug, Clone)]
pub struct CompiledAnalysis {
    pub name: String,
    /// Artifact path relative to the target directory
    pub build_path: PathBuf,
    pub sql: String,
}

/// Everything a compile run produced, before any of it is written
#[derive(Debug)]
pub struct CompileOutput {
    /// Compiled models in execution order
    pub models: Vec<CompiledModel>,
    pub analyses: Vec<CompiledAnalysis>,
    /// Fully qualified names of disabled models that were skipped
    pub skipped: Vec<String>,
    pub graph: DependencyGraph,
}

/// Summary of a compile-and-write run
#[derive(Debug, Clone)]
pub struct CompileSummary {
    pub model_count: usize,
    pub analysis_count: usize,
    pub skipped_count: usize,
    /// Full paths of every file written, in write order
    pub written: Vec<PathBuf>,
}

/// Join statements into artifact text: semicolon-terminated, one blank line
/// between statements.
pub fn artifact_body(statements: &[String]) -> String {
    let mut body = statements.join(";\n\n");
    body.push_str(";\n");
    body
}

/// Reject models that share a name within a package.
///
/// The same name in different packages is allowed; unqualified refs to it
/// fail later as ambiguous.
pub fn validate_unique_names(models: &[Model]) -> Result<(), CompileError> {
    let mut seen: BTreeMap<(&str, &str), Vec<&Model>> = BTreeMap::new();
    for model in models {
        seen.entry((model.package.as_str(), model.name.as_str()))
            .or_default()
            .push(model);
    }

    for ((package, name), group) in seen {
        if group.len() > 1 {
            return Err(CompileError::DuplicateModel {
                name: name.to_string(),
                package: package.to_string(),
                paths: group
                    .iter()
                    .map(|m| m.rel_path.to_string_lossy().to_string())
                    .collect(),
            });
        }
    }

    Ok(())
}

impl Compiler {
    pub fn new(project_dir: impl AsRef<Path>, project: ProjectConfig, target: TargetProfile) -> Self {
        Compiler {
            project_dir: project_dir.as_ref().to_path_buf(),
            project,
            target,
        }
    }

    /// Load the project file and target profile from `project_dir` and build
    /// a compiler over them.
    pub fn from_dir(project_dir: impl AsRef<Path>) -> Result<Self, CompileError> {
        let project_dir = project_dir.as_ref();
        let project = ProjectConfig::load(project_dir)?;
        let target = TargetProfile::load(project_dir)?;
        log::debug!(
            "Loaded project '{}' targeting {} engine",
            project.name,
            target.engine
        );
        Ok(Compiler::new(project_dir, project, target))
    }

    /// Output directory for compiled artifacts
    pub fn target_dir(&self) -> PathBuf {
        self.project_dir.join(&self.project.target_path)
    }

    fn modules_dir(&self) -> PathBuf {
        self.project_dir.join(&self.project.modules_path)
    }

    /// Create the target and modules directories if they do not exist.
    pub fn initialize(&self) -> Result<(), GantryError> {
        fs::create_dir_all(self.target_dir())?;
        fs::create_dir_all(self.modules_dir())?;
        Ok(())
    }

    /// Dependency projects found under the modules directory.
    ///
    /// Each immediate subdirectory containing a project file is loaded;
    /// other entries are ignored. Results are sorted by directory name.
    pub fn dependency_projects(&self) -> Result<Vec<(PathBuf, ProjectConfig)>, CompileError> {
        let modules_dir = self.modules_dir();
        if !modules_dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        let entries = fs::read_dir(&modules_dir).map_err(|e| {
            CompileError::Source(format!(
                "Failed to read modules directory {}: {}",
                modules_dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                CompileError::Source(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if !path.join(PROJECT_FILE).exists() {
                log::debug!("Skipping {}: no project file", path.display());
                continue;
            }
            let project = ProjectConfig::load(&path)?;
            projects.push((path, project));
        }

        projects.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(projects)
    }

    /// Load every model from this project and its dependency projects, with
    /// merged configuration attached and name uniqueness enforced.
    ///
    /// A dependency model's configuration comes from its own project file;
    /// the entry project's `[models.<name>]` blocks are applied on top, so
    /// the entry project has the last word.
    pub fn load_models(&self) -> Result<Vec<Model>, CompileError> {
        let mut models = Vec::new();

        for source_path in &self.project.source_paths {
            let dir = self.project_dir.join(source_path);
            for source in discover_sources(&dir)? {
                let config = self.project.model_config(&source.name);
                models.push(Model::from_source(source, &self.project.name, config));
            }
        }

        for (dep_dir, dep_project) in self.dependency_projects()? {
            for source_path in &dep_project.source_paths {
                let dir = dep_dir.join(source_path);
                for source in discover_sources(&dir)? {
                    let mut config = dep_project.model_config(&source.name);
                    if let Some(patch) = self.project.model_patch(&source.name) {
                        config = patch.apply(&config);
                    }
                    models.push(Model::from_source(source, &dep_project.name, config));
                }
            }
        }

        for model in &models {
            model.config.validate(&model.name)?;
        }

        validate_unique_names(&models)?;

        log::info!("Loaded {} model(s)", models.len());

        Ok(models)
    }

    /// Analysis sources from this project's analysis paths.
    pub fn load_analyses(&self) -> Result<Vec<ModelSource>, CompileError> {
        let mut analyses = Vec::new();
        for analysis_path in &self.project.analysis_paths {
            let dir = self.project_dir.join(analysis_path);
            analyses.extend(discover_sources(&dir)?);
        }
        Ok(analyses)
    }

    /// Compile the project: resolve every ref(), emit statements for every
    /// enabled model, and order the results so dependencies come first.
    ///
    /// Nothing is written; pass the output to [`Compiler::write`] for that.
    ///
    /// # Errors
    ///
    /// Fails on unresolvable or ambiguous refs, refs to disabled models,
    /// contradictory model configuration, duplicate model names, and
    /// dependency cycles.
    pub fn compile(&self) -> Result<CompileOutput, CompileError> {
        let models = self.load_models()?;

        let mut graph = DependencyGraph::new();
        let mut compiled = Vec::new();
        let mut skipped = Vec::new();

        for model in &models {
            if !model.config.enabled {
                log::debug!("Skipping disabled model {}", model.fqn_string());
                skipped.push(model.fqn_string());
                continue;
            }
            compiled.push(self.compile_model(model, &models, &mut graph)?);
        }

        // Order by the graph so artifacts and manifest read dependencies-first;
        // this is also where cycles surface.
        let order = graph.dependency_order()?;
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, fqn)| (fqn.as_str(), i))
            .collect();
        compiled.sort_by_key(|m| position.get(m.fqn.as_str()).copied().unwrap_or(usize::MAX));

        let mut analyses = Vec::new();
        for source in self.load_analyses()? {
            analyses.push(self.compile_analysis(source, &models)?);
        }

        log::info!(
            "Compiled {} model(s) and {} analysis file(s), skipped {}",
            compiled.len(),
            analyses.len(),
            skipped.len()
        );

        Ok(CompileOutput {
            models: compiled,
            analyses,
            skipped,
            graph,
        })
    }

    fn compile_model(
        &self,
        model: &Model,
        models: &[Model],
        graph: &mut DependencyGraph,
    ) -> Result<CompiledModel, CompileError> {
        let fqn = model.fqn_string();
        graph.add_node(&fqn);

        let rendered = render_refs(&model.raw_sql, |call| {
            let referenced = find_model(models, &call.name, call.package.as_deref())?;
            if !referenced.config.enabled {
                return Err(CompileError::DisabledModelRef {
                    model: fqn.clone(),
                    referenced: referenced.fqn_string(),
                });
            }
            graph.add_dependency(&fqn, &referenced.fqn_string());
            Ok(referenced.relation(&self.target).render(&self.target.quoting))
        })?;

        let relation = model.relation(&self.target);
        let creator = self.target.engine.creator(&self.target, &model.config);
        let statements = match model.config.materialized {
            Materialization::Table => {
                creator.create_table_as(model.config.temporary, &relation, &rendered)
            }
            Materialization::View => creator.create_view_as(&relation, &rendered),
        };

        log::debug!("Compiled {} ({} statement(s))", fqn, statements.len());

        Ok(CompiledModel {
            name: model.name.clone(),
            package: model.package.clone(),
            fqn: fqn.clone(),
            materialized: model.config.materialized,
            temporary: model.config.temporary,
            checksum: model.checksum.clone(),
            build_path: model.build_path(),
            statements,
            depends_on: graph.dependencies_of(&fqn),
        })
    }

    /// Analyses get their refs resolved like models but stay plain SELECTs;
    /// they never become graph nodes.
    fn compile_analysis(
        &self,
        source: ModelSource,
        models: &[Model],
    ) -> Result<CompiledAnalysis, CompileError> {
        let fqn = fqn_parts(&self.project.name, &source.rel_path, &source.name).join(".");
        let sql = render_refs(&source.raw_sql, |call| {
            let referenced = find_model(models, &call.name, call.package.as_deref())?;
            if !referenced.config.enabled {
                return Err(CompileError::DisabledModelRef {
                    model: fqn.clone(),
                    referenced: referenced.fqn_string(),
                });
            }
            Ok(referenced.relation(&self.target).render(&self.target.quoting))
        })?;

        Ok(CompiledAnalysis {
            build_path: PathBuf::from(ANALYSIS_DIR).join(&source.rel_path),
            name: source.name,
            sql,
        })
    }

    /// Write a compile output under the target directory.
    ///
    /// Produces one artifact per model and analysis, the dependency graph
    /// file, and the manifest, creating parent directories as needed.
    ///
    /// # Returns
    ///
    /// A summary with counts and every path written.
    pub fn write(&self, output: &CompileOutput) -> Result<CompileSummary, CompileError> {
        self.initialize()?;
        let target_dir = self.target_dir();
        let mut written = Vec::new();

        for model in &output.models {
            let path = target_dir.join(&model.build_path);
            write_artifact(&path, &artifact_body(&model.statements))?;
            written.push(path);
        }

        for analysis in &output.analyses {
            let path = target_dir.join(&analysis.build_path);
            let mut sql = analysis.sql.clone();
            if !sql.ends_with('\n') {
                sql.push('\n');
            }
            write_artifact(&path, &sql)?;
            written.push(path);
        }

        let graph_path = target_dir.join(GRAPH_FILE);
        output.graph.write_graph(&graph_path)?;
        written.push(graph_path);

        let manifest = Manifest::new(&self.project, &self.target, &output.models);
        let manifest_path = target_dir.join(MANIFEST_FILE);
        manifest.write(&manifest_path)?;
        written.push(manifest_path);

        log::info!("Wrote {} file(s) to {}", written.len(), target_dir.display());

        Ok(CompileSummary {
            model_count: output.models.len(),
            analysis_count: output.analyses.len(),
            skipped_count: output.skipped.len(),
            written,
        })
    }
}

fn write_artifact(path: &Path, content: &str) -> Result<(), CompileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CompileError::WriteFailed {
            path: parent.to_string_lossy().to_string(),
            detail: e.to_string(),
        })?;
    }
    fs::write(path, content).map_err(|e| CompileError::WriteFailed {
        path: path.to_string_lossy().to_string(),
        detail: e.to_string(),
    })
}
