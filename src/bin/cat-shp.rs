extern crate shpread;

use std::env;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use shpread::read::shapefile;

fn usage(program: &str) -> ! {
    writeln!(&mut io::stderr(), "Usage: {} <SHP_PATH> [--encoding <LABEL>]", program).unwrap();
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.get(0).map(|s| s.as_str()).unwrap_or("cat-shp");

    let (path, label) = match args.len() {
        2 => (PathBuf::from(&args[1]), None),
        4 if args[2] == "--encoding" => (PathBuf::from(&args[1]), Some(args[3].as_str())),
        _ => usage(program),
    };

    let encoding = match label {
        None => None,
        Some(label) => match shapefile::encoding_from_label(label) {
            Some(enc) => Some(enc),
            None => {
                writeln!(&mut io::stderr(), "Unknown encoding: {}", label).unwrap();
                process::exit(1);
            }
        },
    };

    match shapefile::read(&path, encoding) {
        Err(err) => {
            writeln!(&mut io::stderr(), "Error during read: {}", err).unwrap();
            process::exit(1);
        }
        Ok((header, records)) => {
            match header.shape_type() {
                Some(shape_type) => println!("{:?} file, version {}, box {}", shape_type, header.version, header.bounding_box),
                None => println!("Shape type {} file, version {}, box {}", header.shape_type, header.version, header.bounding_box),
            }

            for record in records.iter() {
                match *record {
                    None => println!("null"),
                    Some(ref shape) => println!("{}", shape),
                }
            }

            println!("Read {} records", records.len());
        }
    }
}
