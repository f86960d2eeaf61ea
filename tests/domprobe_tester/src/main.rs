use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const TECHNIQUE_SWITCHES: &[&str] = &[
    "--disable-keyboard-typos",
    "--disable-visual-similarity",
    "--disable-character-omission",
    "--disable-character-repetition",
    "--disable-character-substitution",
    "--disable-subdomain-variations",
];

fn find_domprobe_binary() -> PathBuf {
    // Priority: DOMPROBE_BIN env var
    if let Ok(path) = env::var("DOMPROBE_BIN") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return p;
        }
    }

    // Try common relative locations from this test app directory
    let candidates = [
        "../../target/release/domprobe",
        "../../target/debug/domprobe",
        "../target/release/domprobe",
        "../target/debug/domprobe",
        "./target/release/domprobe",
        "./target/debug/domprobe",
    ];

    for cand in candidates {
        let p = PathBuf::from(cand);
        if p.is_file() {
            return p;
        }
    }

    // Fall back to PATH lookup
    if let Ok(paths) = env::var("PATH") {
        for dir in paths.split(':') {
            let mut p = PathBuf::from(dir);
            p.push("domprobe");
            if p.is_file() {
                return p;
            }
        }
    }

    panic!("Unable to locate domprobe binary. Set DOMPROBE_BIN env var to the path of ./target/release/domprobe.");
}

fn run_domprobe(args: &[&str]) -> (i32, String, String) {
    let bin = find_domprobe_binary();

    let output = Command::new(bin)
        .arg("--generate-only")
        .args(["--log-level", "ERROR"])
        .args(args)
        .output()
        .expect("failed to execute domprobe");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// Run with every technique switched off except `keep`.
fn run_only(keep: &str, extra: &[&str]) -> (i32, String, String) {
    let mut args: Vec<&str> = TECHNIQUE_SWITCHES
        .iter()
        .copied()
        .filter(|s| !s.ends_with(keep))
        .collect();
    args.extend_from_slice(extra);
    run_domprobe(&args)
}

fn write_tld_file(name: &str, tlds: &[&str]) -> String {
    let mut path = env::temp_dir();
    path.push(format!("domprobe_tester_{}_{}.txt", name, std::process::id()));
    fs::write(&path, tlds.join("\n")).expect("failed to write TLD file");
    path.to_string_lossy().to_string()
}

fn parse_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn assert_contains_domain(candidates: &[String], expected: &str) -> Result<(), String> {
    if candidates.iter().any(|c| c == expected) {
        Ok(())
    } else {
        Err(format!("Expected domain '{}' not found in output", expected))
    }
}

fn assert_not_contains_domain(candidates: &[String], unexpected: &str) -> Result<(), String> {
    if candidates.iter().any(|c| c == unexpected) {
        Err(format!("Unexpected domain '{}' present in output", unexpected))
    } else {
        Ok(())
    }
}

fn assert_len_limit(candidates: &[String], limit: usize) -> Result<(), String> {
    if candidates.len() <= limit {
        Ok(())
    } else {
        Err(format!("Output length {} exceeded limit {}", candidates.len(), limit))
    }
}

fn assert_unique(candidates: &[String]) -> Result<(), String> {
    let unique: HashSet<&String> = candidates.iter().collect();
    if unique.len() == candidates.len() {
        Ok(())
    } else {
        Err(format!("{} duplicate candidates", candidates.len() - unique.len()))
    }
}

fn assert_valid_names(candidates: &[String]) -> Result<(), String> {
    for c in candidates {
        if c.chars().count() > 253 {
            return Err(format!("Candidate longer than 253 characters: {}", c));
        }
        for part in c.split('.') {
            if part.is_empty() || part.starts_with('-') || part.ends_with('-') {
                return Err(format!("Invalid label '{}' in {}", part, c));
            }
        }
    }
    Ok(())
}

// ====== Individual technique tests ======
fn test_omission() -> Result<(), String> {
    let tlds = write_tld_file("omission", &["COM"]);
    let (_code, stdout, _stderr) = run_only("omission", &["--tld-file", &tlds, "-m", "10", "example.com"]);
    let candidates = parse_output(&stdout);

    let expected = [
        "xample.com",
        "eample.com",
        "exmple.com",
        "exaple.com",
        "examle.com",
        "exampe.com",
        "exampl.com",
    ];
    if candidates != expected {
        return Err(format!("Expected {:?}, got {:?}", expected, candidates));
    }
    Ok(())
}

fn test_repetition() -> Result<(), String> {
    let tlds = write_tld_file("repetition", &["com"]);
    let (_code, stdout, _stderr) = run_only("repetition", &["--tld-file", &tlds, "test.com"]);
    let candidates = parse_output(&stdout);
    assert_contains_domain(&candidates, "ttest.com")?;
    assert_contains_domain(&candidates, "tttest.com")?;
    assert_contains_domain(&candidates, "teest.com")?;
    assert_contains_domain(&candidates, "testt.com")?;
    // last position is only doubled
    assert_not_contains_domain(&candidates, "testtt.com")?;
    Ok(())
}

fn test_keyboard_typos() -> Result<(), String> {
    let tlds = write_tld_file("keyboard", &["com"]);
    let (_code, stdout, _stderr) = run_only("keyboard-typos", &["--tld-file", &tlds, "test.com"]);
    let candidates = parse_output(&stdout);
    assert_contains_domain(&candidates, "trst.com")?; // e -> r
    assert_contains_domain(&candidates, "rest.com")?; // t -> r
    assert_no_original(&candidates, "test.com")
}

fn test_visual_similarity() -> Result<(), String> {
    let tlds = write_tld_file("visual", &["com"]);
    let (_code, stdout, _stderr) = run_only("visual-similarity", &["--tld-file", &tlds, "-m", "100", "modern.com"]);
    let candidates = parse_output(&stdout);
    assert_contains_domain(&candidates, "m0dern.com")?;
    assert_contains_domain(&candidates, "modem.com")?; // rn -> m
    Ok(())
}

fn test_idn_is_opt_in() -> Result<(), String> {
    let tlds = write_tld_file("idn", &["com"]);
    let (_code, stdout, _stderr) = run_domprobe(&["--tld-file", &tlds, "-m", "1000", "test.com"]);
    let candidates = parse_output(&stdout);
    if let Some(c) = candidates.iter().find(|c| !c.is_ascii()) {
        return Err(format!("IDN candidate without --enable-idn-confusables: {}", c));
    }

    let mut args: Vec<&str> = TECHNIQUE_SWITCHES.to_vec();
    args.extend_from_slice(&["--enable-idn-confusables", "--tld-file", &tlds, "test.com"]);
    let (_code, stdout, _stderr) = run_domprobe(&args);
    let candidates = parse_output(&stdout);
    // Replace ASCII 'e' with Cyrillic small letter ie (U+0435)
    assert_contains_domain(&candidates, &format!("t{}st.com", '\u{0435}'))
}

// ====== Whole-run invariants ======
fn assert_no_original(candidates: &[String], original: &str) -> Result<(), String> {
    if candidates.iter().any(|c| c == original) {
        Err(format!("Original domain '{}' was included in output", original))
    } else {
        Ok(())
    }
}

fn test_default_run_invariants() -> Result<(), String> {
    let (code, stdout, _stderr) = run_domprobe(&["-m", "200", "paypal.com"]);
    if code != 0 {
        return Err(format!("Exit code {}", code));
    }
    let candidates = parse_output(&stdout);
    if candidates.is_empty() {
        return Err("No candidates generated".to_string());
    }
    assert_len_limit(&candidates, 200)?;
    assert_unique(&candidates)?;
    assert_valid_names(&candidates)?;
    assert_no_original(&candidates, "paypal.com")
}

fn test_url_input_is_normalized() -> Result<(), String> {
    let tlds = write_tld_file("url", &["com"]);
    let (_code, stdout, _stderr) = run_only(
        "omission",
        &["--tld-file", &tlds, "WWW.Example.COM"],
    );
    let candidates = parse_output(&stdout);
    assert_contains_domain(&candidates, "xample.com")?;
    assert_no_original(&candidates, "example.com")
}

fn test_max_variants_enforced() -> Result<(), String> {
    let (_code, stdout, _stderr) = run_domprobe(&["-m", "5", "test.com"]);
    let candidates = parse_output(&stdout);
    assert_len_limit(&candidates, 5)
}

fn test_seed_is_reproducible() -> Result<(), String> {
    let (_c1, first, _e1) = run_domprobe(&["--seed", "42", "-m", "300", "google.com"]);
    let (_c2, second, _e2) = run_domprobe(&["--seed", "42", "-m", "300", "google.com"]);
    if first == second {
        Ok(())
    } else {
        Err("Seeded runs produced different output".to_string())
    }
}

fn test_domain_file_input() -> Result<(), String> {
    let tlds = write_tld_file("file_tlds", &["com"]);
    let mut path = env::temp_dir();
    path.push(format!("domprobe_tester_domains_{}.txt", std::process::id()));
    fs::write(&path, "# targets\nalpha.com\n\nbravo.com\n").map_err(|e| e.to_string())?;
    let domains = path.to_string_lossy().to_string();

    let (_code, stdout, _stderr) = run_only("omission", &["--tld-file", &tlds, &domains]);
    let candidates = parse_output(&stdout);
    assert_contains_domain(&candidates, "lpha.com")?;
    assert_contains_domain(&candidates, "ravo.com")
}

fn test_missing_input_file_fails() -> Result<(), String> {
    let (code, _stdout, stderr) = run_domprobe(&["no-such-domains.txt"]);
    if code != 1 {
        return Err(format!("Expected exit code 1, got {}", code));
    }
    if !stderr.contains("Error") {
        return Err(format!("Expected an error message on stderr, got: {}", stderr));
    }
    Ok(())
}

fn main() {
    // Basic environment check (optional): verify domprobe binary exists
    let bin = find_domprobe_binary();
    eprintln!("Using domprobe binary: {}", bin.display());
    if !bin.is_file() {
        eprintln!("Binary not found. Set DOMPROBE_BIN to path of domprobe or build it with 'cargo build --release' at repo root.");
        std::process::exit(2);
    }

    // Run tests
    let mut failures: Vec<String> = Vec::new();

    let tests: Vec<(&str, fn() -> Result<(), String>)> = vec![
        ("omission", test_omission),
        ("repetition", test_repetition),
        ("keyboard typos", test_keyboard_typos),
        ("visual similarity", test_visual_similarity),
        ("idn is opt-in", test_idn_is_opt_in),
        ("default run invariants", test_default_run_invariants),
        ("url input is normalized", test_url_input_is_normalized),
        ("max variants enforced", test_max_variants_enforced),
        ("seed is reproducible", test_seed_is_reproducible),
        ("domain file input", test_domain_file_input),
        ("missing input file fails", test_missing_input_file_fails),
    ];

    for (name, f) in &tests {
        match f() {
            Ok(()) => println!("[PASS] {}", name),
            Err(err) => {
                println!("[FAIL] {} -> {}", name, err);
                failures.push(format!("{}: {}", name, err));
            }
        }
    }

    if failures.is_empty() {
        println!("\nAll tests passed");
        std::process::exit(0);
    } else {
        println!("\n{} test(s) failed:", failures.len());
        for f in &failures {
            println!(" - {}", f);
        }
        std::process::exit(1);
    }
}
