#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::compiler::DiCompiler;
use di_compiler::di::DependencyKey;
use di_compiler::injector::Injector;
use di_compiler::script::file_put_contents::{file_put_contents, StagedWrite};
use di_compiler::script::{unit_path, ScriptInjector};
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, CarModule};

    #[test]
    fn should_keep_committed_unit_when_writer_dies_before_rename() {
        let dir = tempfile::tempdir().unwrap();
        DiCompiler::from_module(&CarModule, classes(), dir.path())
            .unwrap()
            .compile()
            .unwrap();
        let path = unit_path(dir.path(), &DependencyKey::any("EngineInterface"));
        let committed = fs::read_to_string(&path).unwrap();

        let half_written = &committed.as_bytes()[..committed.len() / 2];
        let staged = StagedWrite::stage(&path, half_written).unwrap();
        drop(staged);

        assert_eq!(fs::read_to_string(&path).unwrap(), committed);
        let injector = ScriptInjector::new(dir.path(), classes(), None);
        let engine = injector.get_instance("EngineInterface", "*").unwrap();
        assert_eq!(engine.as_object().unwrap().class(), "Engine");

        file_put_contents(&path, &committed).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), committed);
    }

    #[test]
    fn should_leave_no_temporary_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.di");
        file_put_contents(&path, "return (1, false);\n").unwrap();
        file_put_contents(&path, "return (2, false);\n").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["unit.di".to_string()]);
    }
}
