//! eartune - resolve and apply device equalization profiles
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use eartune::Resolver;
use eartune::cli::Args;
use eartune::db::Entry;
use eartune::dsp::suggested_preamp_db;

fn print_entry(entry: &Entry) {
    println!(
        "{:<44} {:<24} {:<10} {}",
        entry.label, entry.source, entry.form, entry.rig
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let root: PathBuf = match &args.database {
        Some(dir) => dir.clone(),
        None => eartune::env::get_eartune_dir()?,
    };

    let mut resolver = Resolver::new(&root);
    let count = resolver.build_index()?;
    println!("* Indexed {} measurement entries from {}", count, root.display());

    if let Some(query) = &args.brands {
        for brand in resolver.index().search_brands(query, args.max_results) {
            println!("{}", brand);
        }
    }

    if let Some(brand) = &args.models {
        for entry in resolver
            .index()
            .search_models(brand, args.model.as_deref(), args.max_results)
        {
            print_entry(&entry);
        }
    }

    if let Some(query) = &args.search {
        for entry in resolver.index().search(query, args.max_results) {
            print_entry(&entry);
        }
    }

    if args.groups {
        for group in resolver.index().group_by_model() {
            println!("{} ({} variants)", group.name, group.variants.len());
        }
    }

    if let Some(label) = &args.show {
        let entries = resolver.index().entries_for_label(label);
        if entries.is_empty() {
            eprintln!("⚠️  No measurement entry labelled {}", label);
        }
        for entry in entries {
            let profile = resolver.resolve_entry(entry)?;
            let eq = profile.to_parametric();
            println!(
                "* {} [{} / {} / {}]",
                entry.label, entry.source, entry.form, entry.rig
            );
            print!("{}", eq.to_text());
            println!(
                "Suggested preamp: {:.1} dB",
                suggested_preamp_db(&eq, args.sample_rate)?
            );
        }
    }

    Ok(())
}
