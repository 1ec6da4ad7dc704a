//! ACL listing over librdkafka's DescribeAcls admin API.
//!
//! rust-rdkafka does not wrap the ACL admin calls, so this goes through
//! `rdkafka-sys` directly. Every native object created here is destroyed before
//! returning.
//!
//! TODO: drop this module and the cluster/controller id FFI in `admin.rs` once
//! rdkafka wraps DescribeAcls, `rd_kafka_clusterid` and `rd_kafka_controllerid`.

use rdkafka::error::RDKafkaErrorCode;
use rdkafka_sys as rdsys;
use rdkafka_sys::types::RDKafka;
use std::ffi::{c_char, c_int, CStr};
use std::ptr;
use std::slice;
use std::time::Duration;

use super::{AclEntry, CollectorError, CollectorResult, ErrorKind};

const ERRSTR_SIZE: usize = 512;

unsafe fn text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Owns the native handles of one DescribeAcls request
struct DescribeAclsRequest {
    filter: *mut rdsys::rd_kafka_AclBindingFilter_t,
    options: *mut rdsys::rd_kafka_AdminOptions_t,
    queue: *mut rdsys::rd_kafka_queue_t,
    event: *mut rdsys::rd_kafka_event_t,
}

impl Drop for DescribeAclsRequest {
    fn drop(&mut self) {
        unsafe {
            if !self.event.is_null() {
                rdsys::rd_kafka_event_destroy(self.event);
            }
            if !self.options.is_null() {
                rdsys::rd_kafka_AdminOptions_destroy(self.options);
            }
            if !self.filter.is_null() {
                rdsys::rd_kafka_AclBinding_destroy(self.filter);
            }
            if !self.queue.is_null() {
                rdsys::rd_kafka_queue_destroy(self.queue);
            }
        }
    }
}

/// Lists every ACL binding visible to the client.
///
/// # Safety
///
/// `client` must be a live librdkafka handle for the whole call.
pub(crate) unsafe fn describe_all_acls(client: *mut RDKafka, timeout: Duration) -> CollectorResult<Vec<AclEntry>> {
    let mut errstr = [0 as c_char; ERRSTR_SIZE];
    let mut request = DescribeAclsRequest {
        filter: ptr::null_mut(),
        options: ptr::null_mut(),
        queue: ptr::null_mut(),
        event: ptr::null_mut(),
    };

    request.filter = rdsys::rd_kafka_AclBindingFilter_new(
        rdsys::rd_kafka_ResourceType_t::RD_KAFKA_RESOURCE_ANY,
        ptr::null(),
        rdsys::rd_kafka_ResourcePatternType_t::RD_KAFKA_RESOURCE_PATTERN_ANY,
        ptr::null(),
        ptr::null(),
        rdsys::rd_kafka_AclOperation_t::RD_KAFKA_ACL_OPERATION_ANY,
        rdsys::rd_kafka_AclPermissionType_t::RD_KAFKA_ACL_PERMISSION_TYPE_ANY,
        errstr.as_mut_ptr(),
        ERRSTR_SIZE,
    );
    if request.filter.is_null() {
        return Err(CollectorError::new(
            ErrorKind::Other,
            format!("failed to build ACL filter: {}", text(errstr.as_ptr())),
        ));
    }

    request.queue = rdsys::rd_kafka_queue_new(client);
    request.options =
        rdsys::rd_kafka_AdminOptions_new(client, rdsys::rd_kafka_admin_op_t::RD_KAFKA_ADMIN_OP_DESCRIBEACLS);

    rdsys::rd_kafka_DescribeAcls(client, request.filter, request.options, request.queue);

    let timeout_ms = timeout.as_millis().min(c_int::MAX as u128) as c_int;
    request.event = rdsys::rd_kafka_queue_poll(request.queue, timeout_ms);
    if request.event.is_null() {
        return Err(CollectorError::timeout(timeout.as_secs()));
    }

    let code = RDKafkaErrorCode::from(rdsys::rd_kafka_event_error(request.event));
    if code != RDKafkaErrorCode::NoError {
        let message = text(rdsys::rd_kafka_event_error_string(request.event));
        let kind = match code {
            RDKafkaErrorCode::SecurityDisabled => ErrorKind::SecurityDisabled,
            RDKafkaErrorCode::ClusterAuthorizationFailed => ErrorKind::AccessDenied,
            _ => ErrorKind::from_message(&message),
        };
        return Err(CollectorError::new(kind, format!("DescribeAcls failed: {}", message)));
    }

    let result = rdsys::rd_kafka_event_DescribeAcls_result(request.event);
    if result.is_null() {
        return Ok(Vec::new());
    }

    let mut count: usize = 0;
    let bindings = rdsys::rd_kafka_DescribeAcls_result_acls(result, &mut count);
    if bindings.is_null() || count == 0 {
        return Ok(Vec::new());
    }

    let acls = slice::from_raw_parts(bindings, count)
        .iter()
        .map(|&acl| AclEntry {
            principal: text(rdsys::rd_kafka_AclBinding_principal(acl)),
            host: text(rdsys::rd_kafka_AclBinding_host(acl)),
            operation: text(rdsys::rd_kafka_AclOperation_name(rdsys::rd_kafka_AclBinding_operation(acl))),
            permission_type: text(rdsys::rd_kafka_AclPermissionType_name(
                rdsys::rd_kafka_AclBinding_permission_type(acl),
            )),
            resource_type: text(rdsys::rd_kafka_ResourceType_name(rdsys::rd_kafka_AclBinding_restype(acl))),
            resource_name: text(rdsys::rd_kafka_AclBinding_name(acl)),
            resource_pattern_type: text(rdsys::rd_kafka_ResourcePatternType_name(
                rdsys::rd_kafka_AclBinding_resource_pattern_type(acl),
            )),
        })
        .collect();

    Ok(acls)
}
