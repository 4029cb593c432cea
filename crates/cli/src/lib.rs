//! Interactive command façade over the stockroom engine.
//!
//! Owns all prompting, parsing, and rendering; the engine crates never
//! print, never read the clock, and never exit the process. Engine errors
//! are rendered and the menu loop continues.

use core::fmt;
use core::str::FromStr;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use rust_decimal::Decimal;

use stockroom_catalog::{Catalog, Product, ProductKind};
use stockroom_core::ProductId;
use stockroom_persistence::{load_from_path, save_to_path};

#[derive(Debug, Parser)]
#[command(name = "stockroom", about = "Inventory catalog manager")]
pub struct Cli {
    /// Path used by the save/load menu actions.
    #[arg(long, default_value = "inventory.json")]
    file: PathBuf,
}

pub fn run() -> ExitCode {
    stockroom_observability::init();
    let cli = Cli::parse();

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&cli.file, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal: {err:#}");
            ExitCode::FAILURE
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Drive one interactive session over arbitrary input/output streams.
///
/// Generic over the streams so scripted sessions are testable; `run` wires
/// it to stdin/stdout.
pub fn run_session<R, W>(file: &Path, input: &mut R, out: &mut W) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut catalog = Catalog::new();
    loop {
        write_menu(out)?;
        let Some(choice) = prompt(input, out, "Enter your choice: ")? else {
            break;
        };
        let flow = match choice.as_str() {
            "1" => add_product(&mut catalog, input, out)?,
            "2" => sell_product(&mut catalog, input, out)?,
            "3" => search_by_name(&catalog, input, out)?,
            "4" => search_by_kind(&catalog, input, out)?,
            "5" => list_all(&catalog, out)?,
            "6" => restock_product(&mut catalog, input, out)?,
            "7" => remove_expired(&mut catalog, out)?,
            "8" => save(&catalog, file, out)?,
            "9" => load(&mut catalog, file, out)?,
            "10" => Flow::Quit,
            other => {
                writeln!(out, "Unknown choice: {other}")?;
                Flow::Continue
            }
        };
        if matches!(flow, Flow::Quit) {
            break;
        }
    }
    Ok(())
}

fn write_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Inventory Management")?;
    writeln!(out, "1. Add product")?;
    writeln!(out, "2. Sell product")?;
    writeln!(out, "3. Search product by name")?;
    writeln!(out, "4. Search product by kind")?;
    writeln!(out, "5. List all products")?;
    writeln!(out, "6. Restock product")?;
    writeln!(out, "7. Remove expired products")?;
    writeln!(out, "8. Save catalog to file")?;
    writeln!(out, "9. Load catalog from file")?;
    writeln!(out, "10. Exit")
}

fn add_product<R: BufRead, W: Write>(
    catalog: &mut Catalog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let Some(kind) = prompt_parse::<ProductKind, _, _>(
        input,
        out,
        "Product kind (Electronics/Grocery/Clothing): ",
    )?
    else {
        return Ok(Flow::Quit);
    };
    let Some(id) = prompt(input, out, "Product id: ")? else {
        return Ok(Flow::Quit);
    };
    let Some(name) = prompt(input, out, "Product name: ")? else {
        return Ok(Flow::Quit);
    };
    let Some(price) = prompt_parse::<Decimal, _, _>(input, out, "Unit price: ")? else {
        return Ok(Flow::Quit);
    };
    let Some(quantity) = prompt_parse::<u32, _, _>(input, out, "Quantity in stock: ")? else {
        return Ok(Flow::Quit);
    };

    let product = match kind {
        ProductKind::Electronics => {
            let Some(warranty) = prompt_parse::<u32, _, _>(input, out, "Warranty years: ")? else {
                return Ok(Flow::Quit);
            };
            let Some(brand) = prompt(input, out, "Brand: ")? else {
                return Ok(Flow::Quit);
            };
            Product::electronics(id, name, price, quantity, warranty, brand)
        }
        ProductKind::Grocery => {
            let Some(expiry) =
                prompt_parse::<chrono::NaiveDate, _, _>(input, out, "Expiry date (YYYY-MM-DD): ")?
            else {
                return Ok(Flow::Quit);
            };
            Product::grocery(id, name, price, quantity, expiry)
        }
        ProductKind::Clothing => {
            let Some(size) = prompt(input, out, "Size: ")? else {
                return Ok(Flow::Quit);
            };
            let Some(material) = prompt(input, out, "Material: ")? else {
                return Ok(Flow::Quit);
            };
            Product::clothing(id, name, price, quantity, size, material)
        }
    };

    let result = product.and_then(|p| catalog.add(p));
    render(out, result.map(|()| "Product added"))?;
    Ok(Flow::Continue)
}

fn sell_product<R: BufRead, W: Write>(
    catalog: &mut Catalog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let Some(id) = prompt(input, out, "Product id: ")? else {
        return Ok(Flow::Quit);
    };
    let Some(quantity) = prompt_parse::<i64, _, _>(input, out, "Quantity to sell: ")? else {
        return Ok(Flow::Quit);
    };
    render(
        out,
        catalog
            .sell(&ProductId::from(id), quantity)
            .map(|()| "Sold"),
    )?;
    Ok(Flow::Continue)
}

fn restock_product<R: BufRead, W: Write>(
    catalog: &mut Catalog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let Some(id) = prompt(input, out, "Product id: ")? else {
        return Ok(Flow::Quit);
    };
    let Some(amount) = prompt_parse::<i64, _, _>(input, out, "Amount to restock: ")? else {
        return Ok(Flow::Quit);
    };
    render(
        out,
        catalog
            .restock(&ProductId::from(id), amount)
            .map(|()| "Restocked"),
    )?;
    Ok(Flow::Continue)
}

fn search_by_name<R: BufRead, W: Write>(
    catalog: &Catalog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let Some(name) = prompt(input, out, "Name to search: ")? else {
        return Ok(Flow::Quit);
    };
    write_products(out, catalog.search_by_name(&name))?;
    Ok(Flow::Continue)
}

fn search_by_kind<R: BufRead, W: Write>(
    catalog: &Catalog,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let Some(kind) = prompt_parse::<ProductKind, _, _>(
        input,
        out,
        "Product kind (Electronics/Grocery/Clothing): ",
    )?
    else {
        return Ok(Flow::Quit);
    };
    write_products(out, catalog.search_by_kind(kind))?;
    Ok(Flow::Continue)
}

fn list_all<W: Write>(catalog: &Catalog, out: &mut W) -> anyhow::Result<Flow> {
    write_products(out, catalog.iter().collect())?;
    writeln!(out, "Total value: {}", catalog.total_value())?;
    Ok(Flow::Continue)
}

fn remove_expired<W: Write>(catalog: &mut Catalog, out: &mut W) -> anyhow::Result<Flow> {
    let today = Local::now().date_naive();
    let removed = catalog.remove_expired(today);
    writeln!(out, "Removed {removed} expired products")?;
    Ok(Flow::Continue)
}

fn save<W: Write>(catalog: &Catalog, file: &Path, out: &mut W) -> anyhow::Result<Flow> {
    render(
        out,
        save_to_path(catalog, file).map(|()| format!("Saved to {}", file.display())),
    )?;
    Ok(Flow::Continue)
}

fn load<W: Write>(catalog: &mut Catalog, file: &Path, out: &mut W) -> anyhow::Result<Flow> {
    // Replace wholesale, and only on success.
    match load_from_path(file) {
        Ok(fresh) => {
            writeln!(out, "Loaded {} products from {}", fresh.len(), file.display())?;
            *catalog = fresh;
        }
        Err(err) => writeln!(out, "error: {err}")?,
    }
    Ok(Flow::Continue)
}

fn write_products<W: Write>(out: &mut W, products: Vec<&Product>) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }
    for product in products {
        writeln!(out, "{product}")?;
    }
    Ok(())
}

fn render<W: Write, T: fmt::Display, E: fmt::Display>(
    out: &mut W,
    result: Result<T, E>,
) -> io::Result<()> {
    match result {
        Ok(msg) => writeln!(out, "{msg}"),
        Err(err) => writeln!(out, "error: {err}"),
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    msg: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{msg}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Prompt until the line parses as `T`; `None` means end of input.
fn prompt_parse<T, R, W>(input: &mut R, out: &mut W, msg: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    R: BufRead,
    W: Write,
{
    loop {
        let Some(raw) = prompt(input, out, msg)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(value) => return Ok(Some(value)),
            Err(err) => writeln!(out, "invalid value: {err}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(file: &Path, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_session(file, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_list_and_sell_errors_render_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("inventory.json");

        let script = "1\nElectronics\nE1\nLaptop\n100\n5\n2\nDell\n\
                      2\nE1\n10\n\
                      5\n\
                      10\n";
        let output = run_script(&file, script);

        assert!(output.contains("Product added"));
        assert!(output.contains("error: insufficient stock for E1: requested 10, available 5"));
        assert!(output.contains(
            "Electronics: ID=E1, Name=Laptop, Price=100, Stock=5, Warranty=2 years, Brand=Dell"
        ));
        assert!(output.contains("Total value: 500"));
    }

    #[test]
    fn save_then_load_round_trips_through_the_menu() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("inventory.json");

        let save_script = "1\nClothing\nC1\nShirt\n15\n3\nM\nCotton\n8\n10\n";
        let output = run_script(&file, save_script);
        assert!(output.contains("Saved to"));

        let load_script = "9\n5\n10\n";
        let output = run_script(&file, load_script);
        assert!(output.contains("Loaded 1 products"));
        assert!(output.contains("Clothing: ID=C1, Name=Shirt, Price=15, Stock=3"));
    }

    #[test]
    fn bad_kind_reprompts_and_eof_ends_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let script = "4\nFurniture\n";
        let output = run_script(&dir.path().join("x.json"), script);
        assert!(output.contains("invalid value: unknown product kind: Furniture"));
    }

    #[test]
    fn unknown_menu_choice_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_script(&dir.path().join("x.json"), "42\n10\n");
        assert!(output.contains("Unknown choice: 42"));
    }
}
