use tonic_build::manual::{Builder, Method, Service};

// Messages are declared by hand in `src/proto.rs`; only the service stubs are
// generated, so the build does not depend on an installed `protoc`.
fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{input}"))
        .output_type(format!("crate::proto::{output}"))
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let upload = Method::builder()
        .name("upload")
        .route_name("Upload")
        .input_type("crate::proto::UploadRequest")
        .output_type("crate::proto::UploadResponse")
        .codec_path("tonic::codec::ProstCodec")
        .client_streaming()
        .build();

    let download = Method::builder()
        .name("download")
        .route_name("Download")
        .input_type("crate::proto::DownloadRequest")
        .output_type("crate::proto::DownloadResponse")
        .codec_path("tonic::codec::ProstCodec")
        .server_streaming()
        .build();

    let service = Service::builder()
        .name("StorageService")
        .package("storage")
        .method(unary("mkdir", "Mkdir", "MkdirRequest", "MkdirResponse"))
        .method(unary("read_dir", "ReadDir", "ReadDirRequest", "ReadDirResponse"))
        .method(unary("remove", "Remove", "RemoveRequest", "RemoveResponse"))
        .method(unary(
            "remove_all",
            "RemoveAll",
            "RemoveAllRequest",
            "RemoveAllResponse",
        ))
        .method(upload)
        .method(download)
        .build();

    Builder::new().compile(&[service]);
}
