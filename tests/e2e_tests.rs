//! End-to-end integration tests
//!
//! These tests drive the ledger through the same path as the binary: command
//! lines are parsed with the CLI parser, executed by a `LedgerService` over CSV
//! sheets in a temporary data directory, and the final balances are rendered as
//! CSV and compared with a fixture.
//!
//! Each fixture under tests/fixtures/ holds:
//! - `commands.txt` - one command per line; a leading `!` means it must be rejected
//! - `expected.csv` - the balances after the last command
//! - optional `names.csv` / `split_awards.csv` - sheet seed files
//!
//! Each fixture is run twice: once with a single long-lived service and once
//! reopening the service for every command, as separate CLI invocations do.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use split_ledger::cli::CliArgs;
    use split_ledger::io::{write_balances_csv, CsvSheetStoreFactory, SettingsFile, DEMO_SHEET_ID};
    use split_ledger::{Command, CommandOutput, LedgerError, LedgerService};
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to create runtime")
    }

    fn open_service(data_dir: &Path) -> LedgerService {
        LedgerService::open(
            Box::new(CsvSheetStoreFactory::new(data_dir)),
            SettingsFile::new(data_dir.join("store.json")),
        )
        .expect("Failed to open service")
    }

    fn parse_command(line: &str) -> Command {
        let args = std::iter::once("split-ledger").chain(line.split_whitespace());
        CliArgs::try_parse_from(args)
            .unwrap_or_else(|e| panic!("Bad fixture command '{}': {}", line, e))
            .command
            .into_command()
    }

    fn balances_csv(service: &LedgerService, rt: &tokio::runtime::Runtime) -> String {
        let rows = match rt.block_on(service.execute(Command::Balances)).unwrap() {
            CommandOutput::Balances(rows) => rows,
            other => panic!("unexpected output {:?}", other),
        };
        let mut output = Vec::new();
        write_balances_csv(&rows, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    /// Seed the demo sheet from the fixture, if it carries seed files
    fn seed_sheet(fixture_dir: &Path, data_dir: &Path) {
        let sheet_dir = data_dir.join(DEMO_SHEET_ID);
        fs::create_dir_all(&sheet_dir).unwrap();
        for file in ["names.csv", "split_awards.csv"] {
            let source = fixture_dir.join(file);
            if source.exists() {
                fs::copy(&source, sheet_dir.join(file)).unwrap();
            }
        }
    }

    /// Run a fixture and compare the final balances with expected.csv
    fn run_test_fixture(fixture_name: &str, reopen_per_command: bool) {
        let fixture_dir = Path::new("tests/fixtures").join(fixture_name);
        let commands_path = fixture_dir.join("commands.txt");
        let expected_path = fixture_dir.join("expected.csv");

        let commands = fs::read_to_string(&commands_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", commands_path.display(), e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", expected_path.display(), e));

        let data_dir = tempdir().unwrap();
        seed_sheet(&fixture_dir, data_dir.path());

        let rt = runtime();
        let mut service = open_service(data_dir.path());

        for line in commands.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (expect_rejection, line) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, line),
            };
            if reopen_per_command {
                service = open_service(data_dir.path());
            }

            let result = rt.block_on(service.execute(parse_command(line)));
            match (expect_rejection, &result) {
                (false, Err(e)) => panic!("{}: '{}' failed: {}", fixture_name, line, e),
                (true, Ok(_)) => panic!("{}: '{}' should have been rejected", fixture_name, line),
                (true, Err(e)) => assert!(!e.is_persistence(), "{}: '{}': {}", fixture_name, line, e),
                (false, Ok(_)) => {}
            }
        }

        let actual_output = balances_csv(&service, &rt);
        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (reopen: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, reopen_per_command, actual_output, expected_output
        );

        // Replaying the persisted sheet gives the same balances
        let reloaded = open_service(data_dir.path());
        assert_eq!(balances_csv(&reloaded, &rt), expected_output);
    }

    /// End-to-end test for all fixtures, with and without reopening
    #[rstest]
    #[case("end_to_end")]
    #[case("double_convert")]
    #[case("rejected_commands")]
    #[case("contributions_and_splits")]
    #[case("undo_to_empty")]
    fn test_fixtures(#[case] fixture: &str, #[values(false, true)] reopen_per_command: bool) {
        run_test_fixture(fixture, reopen_per_command);
    }

    fn data_dir_with_service() -> (TempDir, LedgerService, tokio::runtime::Runtime) {
        let dir = tempdir().unwrap();
        let service = open_service(dir.path());
        (dir, service, runtime())
    }

    fn create(name: &str, split: &str) -> Command {
        Command::CreateSplit {
            name: name.to_string(),
            split_string: split.to_string(),
        }
    }

    #[test]
    fn test_first_run_creates_demo_sheet_and_settings() {
        let (dir, service, rt) = data_dir_with_service();

        assert_eq!(
            rt.block_on(service.execute(Command::GetSheetId)).unwrap(),
            CommandOutput::SheetId(DEMO_SHEET_ID.to_string())
        );
        let settings: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("store.json")).unwrap())
                .unwrap();
        assert_eq!(settings["sheet-id"]["value"], DEMO_SHEET_ID);

        let sheet = dir.path().join(DEMO_SHEET_ID);
        assert_eq!(
            fs::read_to_string(sheet.join("names.csv")).unwrap(),
            "name\nAlice\nBob\nCharlie\nDana\nPot\n"
        );
        assert_eq!(
            fs::read_to_string(sheet.join("transactions.csv")).unwrap(),
            "creditor,debtor,amount,split,time,pot_amount,date\n"
        );
    }

    #[test]
    fn test_transactions_file_records_pot_amount() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(create("Alice", "7-9"))).unwrap();
        rt.block_on(service.execute(create("Bob", "7-10"))).unwrap();

        let raw = fs::read_to_string(dir.path().join(DEMO_SHEET_ID).join("transactions.csv")).unwrap();
        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Alice");
        assert_eq!(&rows[0][1], "Pot");
        assert_eq!(&rows[0][3], "7-9");
        assert_eq!(&rows[0][5], "-5.00");
        assert_eq!(&rows[1][5], "-30.00");
    }

    #[test]
    fn test_recent_transactions_most_recent_first() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(create("Alice", "7-9"))).unwrap();
        rt.block_on(service.execute(create("Bob", "2-3"))).unwrap();
        rt.block_on(service.execute(Command::Contribute {
            name: "Charlie".to_string(),
            amount: Decimal::new(5, 0),
        }))
        .unwrap();

        let reopened = open_service(dir.path());
        let recent = match rt
            .block_on(reopened.execute(Command::Transactions { count: 2 }))
            .unwrap()
        {
            CommandOutput::Transactions(rows) => rows,
            other => panic!("unexpected output {:?}", other),
        };
        let order: Vec<(&str, &str)> = recent
            .iter()
            .map(|t| (t.creditor.as_str(), t.debtor.as_str()))
            .collect();
        assert_eq!(order, vec![("Pot", "Charlie"), ("Bob", "Pot")]);

        let none = rt
            .block_on(reopened.execute(Command::Transactions { count: 0 }))
            .unwrap();
        assert_eq!(none, CommandOutput::Transactions(Vec::new()));
    }

    #[test]
    fn test_sheet_switch_survives_restart() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(create("Alice", "7-9"))).unwrap();

        rt.block_on(service.execute(Command::SetSheetId {
            sheet_id: "league".to_string(),
        }))
        .unwrap();
        rt.block_on(service.execute(create("Bob", "7-10"))).unwrap();
        drop(service);

        let service = open_service(dir.path());
        assert_eq!(
            rt.block_on(service.execute(Command::GetSheetId)).unwrap(),
            CommandOutput::SheetId("league".to_string())
        );
        assert_eq!(
            balances_csv(&service, &rt),
            "name,amount\nAlice,0.00\nBob,25.00\nCharlie,0.00\nDana,0.00\nPot,-25.00\n"
        );

        rt.block_on(service.execute(Command::SetDemoSheetId)).unwrap();
        assert_eq!(
            balances_csv(&service, &rt),
            "name,amount\nAlice,5.00\nBob,0.00\nCharlie,0.00\nDana,0.00\nPot,-5.00\n"
        );
    }

    #[test]
    fn test_invalid_sheet_id_rejected() {
        let (dir, service, rt) = data_dir_with_service();
        let err = rt
            .block_on(service.execute(Command::SetSheetId {
                sheet_id: "../outside".to_string(),
            }))
            .unwrap_err();

        assert_eq!(err, LedgerError::invalid_sheet_id("../outside"));
        assert!(!dir.path().parent().unwrap().join("outside").exists());
        assert_eq!(
            rt.block_on(service.execute(Command::GetSheetId)).unwrap(),
            CommandOutput::SheetId(DEMO_SHEET_ID.to_string())
        );
    }

    #[test]
    fn test_corrupt_sheet_can_be_switched_away_from() {
        let dir = tempdir().unwrap();
        let sheet = dir.path().join("league");
        fs::create_dir_all(&sheet).unwrap();
        fs::write(
            sheet.join("transactions.csv"),
            "creditor,debtor,amount,split,time,pot_amount,date\nAlice,Pot,five,7-9,,,\n",
        )
        .unwrap();
        SettingsFile::new(dir.path().join("store.json"))
            .set_sheet_id("league")
            .unwrap();

        let rt = runtime();
        let service = open_service(dir.path());
        let err = rt.block_on(service.execute(Command::Balances)).unwrap_err();
        assert!(err.is_persistence());
        assert!(err.to_string().contains("line 2"));
        assert_eq!(
            rt.block_on(service.execute(Command::GetSheetId)).unwrap(),
            CommandOutput::SheetId("league".to_string())
        );

        // A later invocation recovers by selecting the demo sheet
        let service = open_service(dir.path());
        rt.block_on(service.execute(Command::SetDemoSheetId)).unwrap();
        let service = open_service(dir.path());
        assert_eq!(
            balances_csv(&service, &rt),
            "name,amount\nAlice,0.00\nBob,0.00\nCharlie,0.00\nDana,0.00\nPot,0.00\n"
        );
    }

    #[test]
    fn test_concurrent_invocations_settle_split_once() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(create("Alice", "7-9"))).unwrap();
        let convert = || Command::ConvertSplit {
            name: "Alice".to_string(),
            split_string: "7-9".to_string(),
        };

        // Two invocations load the sheet while the split is still open
        let first = open_service(dir.path());
        let second = open_service(dir.path());
        balances_csv(&first, &rt);
        balances_csv(&second, &rt);

        rt.block_on(first.execute(convert())).unwrap();
        let err = rt.block_on(second.execute(convert())).unwrap_err();
        assert!(err.is_persistence());

        let reloaded = open_service(dir.path());
        assert_eq!(
            balances_csv(&reloaded, &rt),
            "name,amount\nAlice,0.00\nBob,0.00\nCharlie,0.00\nDana,0.00\nPot,0.00\n"
        );
        assert_eq!(
            rt.block_on(reloaded.execute(Command::OpenSplits)).unwrap(),
            CommandOutput::Transactions(Vec::new())
        );
    }

    #[test]
    fn test_overflowing_contribution_rejected() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(Command::Contribute {
            name: "Alice".to_string(),
            amount: Decimal::MAX,
        }))
        .unwrap();

        let err = rt
            .block_on(service.execute(Command::Contribute {
                name: "Bob".to_string(),
                amount: Decimal::ONE,
            }))
            .unwrap_err();
        assert_eq!(err, LedgerError::invalid_amount(Decimal::ONE));

        let reloaded = open_service(dir.path());
        let rows = match rt.block_on(reloaded.execute(Command::Transactions { count: 10 })).unwrap() {
            CommandOutput::Transactions(rows) => rows,
            other => panic!("unexpected output {:?}", other),
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pot_amount, Decimal::MAX);
    }

    #[test]
    fn test_activity_log_records_undo() {
        let (dir, service, rt) = data_dir_with_service();
        rt.block_on(service.execute(create("Alice", "7-9"))).unwrap();
        rt.block_on(service.execute(Command::RemoveLastTransaction))
            .unwrap();

        let raw = fs::read_to_string(dir.path().join(DEMO_SHEET_ID).join("activity_log.csv")).unwrap();
        let actions: Vec<&str> = raw
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(actions, vec!["Split", "Undo"]);
        assert_eq!(
            fs::read_to_string(dir.path().join(DEMO_SHEET_ID).join("transactions.csv")).unwrap(),
            "creditor,debtor,amount,split,time,pot_amount,date\n"
        );
    }
}
