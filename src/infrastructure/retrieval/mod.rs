mod stub_retriever;

pub use stub_retriever::StubRetriever;
