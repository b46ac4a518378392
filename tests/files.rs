use std::path::PathBuf;

use hashbrown::HashSet;
use libtest_mimic::Trial;
use zeroth::*;

#[derive(Clone)]
struct Run {
    path: PathBuf,
    reprinted: bool,
}

impl Run {
    fn run(&self) {
        let _ = env_logger::builder().is_test(true).try_init();
        let text = std::fs::read_to_string(&self.path)
            .unwrap_or_else(|err| panic!("Couldn't read {:?}: {:?}", self.path, err));

        if !self.reprinted {
            self.test_proof(self.path.to_str().map(String::from), &text, "Top level error");
        } else {
            let reprinted = parse_proof(self.path.to_str().map(String::from), &text)
                .unwrap()
                .iter()
                .map(|line| line.to_string())
                .collect::<Vec<_>>()
                .join("\n");

            self.test_proof(
                None,
                &reprinted,
                "ERROR after parse, to_string, and parse again.",
            );
        }
    }

    fn test_proof(&self, filename: Option<String>, text: &str, message: &str) {
        match parse_and_check_proof(filename, text) {
            Ok(proof) => {
                if self.should_fail() {
                    panic!("Proof should have failed! Instead, checked:\n{proof}");
                }
                log::info!("\n{proof}");
                // checking the checked lines again must agree
                let again = check_proof(&proof.to_proof()).unwrap();
                assert_eq!(again, proof);
            }
            Err(err) => {
                if !self.should_fail() {
                    panic!("{}: {err}", message)
                }
                log::info!("rejected as expected: {err}");
            }
        }
    }

    fn into_trial(self) -> Trial {
        let name = self.name().to_string();
        Trial::test(name, move || {
            self.run();
            Ok(())
        })
    }

    fn name(&self) -> impl std::fmt::Display + '_ {
        struct Wrapper<'a>(&'a Run);
        impl std::fmt::Display for Wrapper<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.0.should_fail() {
                    write!(f, "fail-check/")?;
                }
                let stem = self.0.path.file_stem().unwrap();
                let stem_str = stem.to_string_lossy().replace(['.', '-', ' '], "_");
                write!(f, "{stem_str}")?;
                if self.0.reprinted {
                    write!(f, "_reprinted")?;
                }
                Ok(())
            }
        }
        Wrapper(self)
    }

    fn should_fail(&self) -> bool {
        self.path.to_string_lossy().contains("fail-check")
    }
}

fn generate_tests(glob: &str) -> Vec<Trial> {
    let mut trials = vec![];
    let mut push_trial = |run: Run| trials.push(run.into_trial());

    for entry in glob::glob(glob).unwrap() {
        let run = Run {
            path: entry.unwrap().clone(),
            reprinted: false,
        };
        let should_fail = run.should_fail();

        push_trial(run.clone());
        if !should_fail {
            push_trial(Run {
                reprinted: true,
                ..run
            });
        }
    }

    trials
}

fn main() {
    let args = libtest_mimic::Arguments::from_args();
    let tests = generate_tests("tests/proofs/**/*.proof");
    // ensure all the tests have unique names
    let mut names = HashSet::new();
    for test in &tests {
        let name = test.name().to_string();
        if !names.insert(name.clone()) {
            panic!("Duplicate test name: {}", name);
        }
    }
    libtest_mimic::run(&args, tests).exit();
}
