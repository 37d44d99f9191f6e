use assert_fs::prelude::*;
use convert_vcf::{ConversionConfig, Mode, convert_file, discover_inputs};
use std::io::Write;
use std::path::PathBuf;

const VCF: &str = "##fileformat=VCFv4.2\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tm1\to1e1\n\
1\t10\t.\tA\tC\t.\tPASS\t.\tGT:DP:AD\t0/1:9:4,5\t0/0:6:6,0\n\
1\t20\t.\tG\tT\t.\tPASS\t.\tGT:DP:AD\t./.:0:0,0\t1/1:7:0,7\n";

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn create_gz_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.child(name);
    path.write_binary(&gzip(content.as_bytes())).unwrap();
    path.path().to_path_buf()
}

#[test]
fn gzipped_vcf_converts_like_plain() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = create_gz_file(&temp, "run7.vcf.gz", VCF);

    let config = ConversionConfig::new(Mode::ColonyVariable, temp.path());
    let summary = convert_file(&input, &config).unwrap();

    assert_eq!(summary.loci, 2);
    assert_eq!(summary.outputs, vec![temp.path().join("COLrun7.txt")]);
    temp.child("COLrun7.txt")
        .assert("m1\tm1\to1e1\n1\t2\t1\n-9\t-9\t2\n");
}

#[test]
fn concatenated_gzip_members_are_read_fully() {
    // BGZF files are a series of gzip members
    let (head, tail) = VCF.split_at(VCF.find("1\t20").unwrap());
    let mut data = gzip(head.as_bytes());
    data.extend(gzip(tail.as_bytes()));

    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("blocks.vcf.gz");
    input.write_binary(&data).unwrap();

    let config = ConversionConfig::new(Mode::Had, temp.path());
    let summary = convert_file(input.path(), &config).unwrap();
    assert_eq!(summary.loci, 2);
    temp.child("HADblocks.txt")
        .assert("m1\tm1\to1e1\to1e1\n4\t5\tNA\tNA\nNA\tNA\tNA\tNA\n");
}

#[test]
fn directory_discovery_includes_gzipped_inputs() {
    let temp = assert_fs::TempDir::new().unwrap();
    create_gz_file(&temp, "b.vcf.gz", VCF);
    temp.child("a.vcf").write_str(VCF).unwrap();
    temp.child("c.vcf.bak").write_str(VCF).unwrap();

    let inputs = discover_inputs(temp.path()).unwrap();
    assert_eq!(
        inputs,
        vec![temp.path().join("a.vcf"), temp.path().join("b.vcf.gz")]
    );
}
