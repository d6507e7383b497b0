use anyhow::{bail, Result};
use litescan::{Database, QueryOutput};

fn main() -> Result<()> {
  // Parse arguments
  let args = std::env::args().collect::<Vec<_>>();
  match args.len() {
    0 | 1 => bail!("Missing <database path> and <command>"),
    2 => bail!("Missing <command>"),
    _ => {}
  }

  let database = Database::open(&args[1])?;

  // Parse command and act accordingly
  match args[2].as_str() {
    ".dbinfo" => {
      let info = database.info()?;
      println!("database page size: {}", info.page_size);
      println!("number of tables: {}", info.schema_entry_count);
    }
    ".tables" => {
      println!("{}", database.tables()?.join(" "));
    }
    sql => match database.query(sql)? {
      QueryOutput::Count(count) => println!("{}", count),
      QueryOutput::Rows(rows) => {
        for row in rows {
          let fields = row.iter().map(ToString::to_string).collect::<Vec<_>>();
          println!("{}", fields.join("|"));
        }
      }
    },
  }

  Ok(())
}
