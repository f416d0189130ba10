mod support;

use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use assert_cmd::cargo::cargo_bin;
use support::TestDir;

const WRITERS: usize = 16;

fn tapestry_bin() -> PathBuf {
    cargo_bin("tapestry")
}

fn spawn_tapestry(data_dir: &Path, args: &[String]) -> std::io::Result<Child> {
    Command::new(tapestry_bin())
        .env_remove("TAPESTRY_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--quiet")
        .args(args)
        .spawn()
}

#[test]
fn concurrent_task_adds_are_all_persisted() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    dir.json_ok(&["init"]);

    let mut children = Vec::new();
    for idx in 0..WRITERS {
        let args = vec![
            "task".to_string(),
            "add".to_string(),
            "morning".to_string(),
            format!("t{idx}"),
        ];
        children.push(spawn_tapestry(&dir.data_dir(), &args)?);
    }
    for mut child in children {
        assert!(child.wait()?.success());
    }

    let periods = dir.read_blob("todo-periods").expect("periods blob");
    let mut titles: Vec<String> = periods[0]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["title"].as_str().unwrap_or_default().to_string())
        .collect();
    titles.sort();
    let mut expected: Vec<String> = (0..WRITERS).map(|idx| format!("t{idx}")).collect();
    expected.sort();
    assert_eq!(titles, expected);

    let analytics = dir.read_blob("todo-analytics").expect("analytics blob");
    assert_eq!(analytics[0]["totalTasks"], WRITERS);
    Ok(())
}

#[test]
fn concurrent_toggles_and_adds_do_not_clobber_each_other() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = TestDir::new();
    let ids: Vec<String> = (0..4).map(|idx| dir.add_task("night", &format!("n{idx}"))).collect();

    let mut children = Vec::new();
    for id in &ids {
        let args = vec!["task".to_string(), "done".to_string(), id.clone()];
        children.push(spawn_tapestry(&dir.data_dir(), &args)?);
        let args = vec![
            "task".to_string(),
            "add".to_string(),
            "evening".to_string(),
            format!("after {id}"),
        ];
        children.push(spawn_tapestry(&dir.data_dir(), &args)?);
    }
    for mut child in children {
        assert!(child.wait()?.success());
    }

    let listing = dir.json_ok(&["task", "ls"]);
    assert_eq!(listing["total"], 8);
    let night = listing["periods"][3]["tasks"].as_array().expect("night tasks");
    assert!(night.iter().all(|task| task["completed"] == true));
    Ok(())
}
