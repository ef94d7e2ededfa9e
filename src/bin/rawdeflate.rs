use raw_deflate_rs::{compress_file_buffered, decompress_file_buffered};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
struct DeflateParams {
    input: PathBuf,
    output: Option<PathBuf>,
    /// Decompress instead of compress
    #[structopt(short)]
    decompress: bool,
    /// Run without writing the result anywhere
    #[structopt(short)]
    simulate: bool,
}

const BUF_SIZE: usize = 1024 * 512;

fn main() {
    let params: DeflateParams = DeflateParams::from_args();

    if params.simulate {
        let result = if params.decompress {
            decompress_file_buffered(&params.input, |_| Ok(()), BUF_SIZE).unwrap()
        } else {
            compress_file_buffered(&params.input, |_| Ok(()), BUF_SIZE).unwrap()
        };
        println!("{} bytes, crc32 {:08x}", result.written, result.crc32);
        return;
    }

    let output_path = params.output.unwrap_or_else(|| {
        if params.decompress {
            params.input.with_extension("")
        } else {
            let mut path = params.input.clone().into_os_string();
            path.push(".rdfl");
            PathBuf::from(path)
        }
    });

    let mut write_file = BufWriter::new(File::create(output_path).unwrap());

    if params.decompress {
        decompress_file_buffered(
            &params.input,
            |data| write_file.write_all(data).map_err(|_| ()),
            BUF_SIZE,
        )
        .unwrap();
    } else {
        compress_file_buffered(
            &params.input,
            |data| write_file.write_all(data).map_err(|_| ()),
            BUF_SIZE,
        )
        .unwrap();
    }
}
